// Upstair - Battery Monitor
//
// One-shot ADC reads of the battery divider on GPIO2 / ADC1_CHANNEL_2.

use anyhow::bail;

use esp_idf_sys as sys;

/// Divider ratio between the cell and the ADC pin (1:2).
const DIVIDER: u32 = 2;
const ADC_FULL_SCALE_MV: u32 = 3300;
const ADC_MAX_RAW: u32 = 4095;

pub struct BatteryMonitor {
    handle: sys::adc_oneshot_unit_handle_t,
    channel: sys::adc_channel_t,
}

// SAFETY: the one-shot unit handle is only touched through `&mut self`, so it
// is never used from two threads at once.
unsafe impl Send for BatteryMonitor {}

impl BatteryMonitor {
    /// Claim ADC unit 1 and configure the battery channel with 11 dB
    /// attenuation (0-3.3 V range).
    pub fn new() -> anyhow::Result<Self> {
        let mut handle: sys::adc_oneshot_unit_handle_t = core::ptr::null_mut();
        let channel = sys::adc_channel_t_ADC_CHANNEL_2; // GPIO2

        unsafe {
            let unit_cfg = sys::adc_oneshot_unit_init_cfg_t {
                unit_id: sys::adc_unit_t_ADC_UNIT_1,
                ulp_mode: sys::adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
                ..core::mem::zeroed()
            };
            let ret = sys::adc_oneshot_new_unit(&unit_cfg, &mut handle);
            if ret != sys::ESP_OK {
                bail!("ADC unit init failed ({})", ret);
            }

            let chan_cfg = sys::adc_oneshot_chan_cfg_t {
                atten: sys::adc_atten_t_ADC_ATTEN_DB_11,
                bitwidth: sys::adc_bitwidth_t_ADC_BITWIDTH_12,
            };
            let ret = sys::adc_oneshot_config_channel(handle, channel, &chan_cfg);
            if ret != sys::ESP_OK {
                bail!("ADC channel config failed ({})", ret);
            }
        }

        Ok(Self { handle, channel })
    }

    /// Cell voltage in millivolts.
    pub fn read_millivolts(&mut self) -> anyhow::Result<u32> {
        let mut raw: i32 = 0;
        let ret = unsafe { sys::adc_oneshot_read(self.handle, self.channel, &mut raw) };
        if ret != sys::ESP_OK {
            bail!("ADC read failed ({})", ret);
        }
        let raw = raw.clamp(0, ADC_MAX_RAW as i32) as u32;
        Ok(raw * ADC_FULL_SCALE_MV / ADC_MAX_RAW * DIVIDER)
    }
}
