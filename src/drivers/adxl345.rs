use esp_hal::{
    i2c::master::{Error, I2c},
    Blocking,
};

use crate::app::types::SensorSample;

const ADDR: u8 = 0x53;
const REG_POWER_CTL: u8 = 0x2D;
const REG_DATA_FORMAT: u8 = 0x31;
const REG_DATAX0: u8 = 0x32;

/// ADXL345 over I2C, full-resolution ±16 g mode. Read failures surface to
/// the caller; the driver never substitutes stale data.
pub(crate) struct Adxl345 {
    bus: I2c<'static, Blocking>,
}

impl Adxl345 {
    pub(crate) fn new(bus: I2c<'static, Blocking>) -> Result<Self, Error> {
        let mut sensor = Self { bus };
        // Measurement mode, then FULL_RES with the ±16 g range.
        sensor.bus.write(ADDR, &[REG_POWER_CTL, 0x08])?;
        sensor.bus.write(ADDR, &[REG_DATA_FORMAT, 0x0B])?;
        Ok(sensor)
    }

    pub(crate) fn read_acceleration(&mut self) -> Result<SensorSample, Error> {
        let mut data = [0u8; 6];
        self.bus.write_read(ADDR, &[REG_DATAX0], &mut data)?;
        let x = i16::from_le_bytes([data[0], data[1]]);
        let y = i16::from_le_bytes([data[2], data[3]]);
        let z = i16::from_le_bytes([data[4], data[5]]);
        Ok(SensorSample::new(to_mg(x), to_mg(y), to_mg(z)))
    }
}

// Full-resolution scale factor: 3.9 mg per LSB.
fn to_mg(raw: i16) -> i32 {
    i32::from(raw) * 39 / 10
}
