//! Register interface adapter between the typed register map and the bus
//! arbiter
//!
//! The generated register device speaks `device_driver::RegisterInterface`;
//! this module implements that trait on top of a [`BusTransaction`] guard and
//! a [`DeviceHandle`], so typed register access is only possible while the
//! bus lock is held.

use device_driver::RegisterInterface;
use embedded_hal::i2c::I2c;

use crate::bus::{BusTransaction, DeviceHandle};

/// Register-level access to one device for the duration of one bus
/// transaction
pub struct TransactionInterface<'a, 'bus, I2C> {
    bus: &'a mut BusTransaction<'bus, I2C>,
    device: &'a DeviceHandle,
}

impl<'a, 'bus, I2C> TransactionInterface<'a, 'bus, I2C> {
    /// Bind a device handle to an in-progress transaction
    pub fn new(bus: &'a mut BusTransaction<'bus, I2C>, device: &'a DeviceHandle) -> Self {
        Self { bus, device }
    }
}

impl<I2C, E> RegisterInterface for TransactionInterface<'_, '_, I2C>
where
    I2C: I2c<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in read_data.len() for I2C
        self.bus.read_registers(self.device, address, read_data)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits;
        // The BMP280 map only has single-byte writable registers
        match write_data.first() {
            Some(&value) => self.bus.write_register(self.device, address, value),
            None => Ok(()),
        }
    }
}
