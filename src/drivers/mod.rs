pub(crate) mod adxl345;
pub(crate) mod button;
pub(crate) mod encoder;
