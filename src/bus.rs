//! Shared-bus arbitration
//!
//! One [`I2cBus`] owns the physical bus handle and serializes register-level
//! traffic from every driver sharing the wire. A logical transaction may span
//! several byte-level operations (e.g. trigger, poll, burst-read); the bus
//! lock is held for the whole closure passed to [`I2cBus::transaction`], so
//! two drivers can never interleave their byte operations on the wire.
//!
//! Register access is only reachable through the [`BusTransaction`] guard the
//! closure receives, which makes unguarded access a compile error rather than
//! a race.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::Error;

/// Maximum number of devices that can be registered on one bus
pub const MAX_DEVICES: usize = 8;

/// Highest accepted per-device bus clock (Fast-mode Plus), in Hz
pub const MAX_BUS_CLOCK_HZ: u32 = 1_000_000;

/// A reservation token for one device address on the bus
///
/// Handles are only minted by [`I2cBus::register_device`] and are neither
/// clonable nor copyable, so a released reservation cannot be used again.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceHandle {
    address: SevenBitAddress,
    clock_hz: u32,
}

impl DeviceHandle {
    /// The reserved 7-bit wire address
    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// The bus clock requested for this device, in Hz
    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }
}

struct BusState<I2C> {
    i2c: I2C,
    devices: heapless::Vec<SevenBitAddress, MAX_DEVICES>,
}

/// The bus arbiter: single point of serialized access to one physical bus
///
/// Generic over the lock flavor (`M`) so firmware can pick e.g.
/// `CriticalSectionRawMutex` while host tests use the same type with the
/// `critical-section/std` implementation. No fairness beyond what the chosen
/// lock provides is guaranteed.
pub struct I2cBus<M: RawMutex, I2C> {
    state: Mutex<M, RefCell<BusState<I2C>>>,
    // Set while a transaction closure runs, so try_transaction can report
    // Busy without queueing on the lock
    in_transaction: AtomicBool,
}

impl<M: RawMutex, I2C> I2cBus<M, I2C> {
    /// Take ownership of the physical bus handle
    pub const fn new(i2c: I2C) -> Self {
        Self {
            state: Mutex::new(RefCell::new(BusState {
                i2c,
                devices: heapless::Vec::new(),
            })),
            in_transaction: AtomicBool::new(false),
        }
    }

    /// Release a device reservation
    ///
    /// Safe to call on an already-removed handle; the call is then a no-op.
    pub fn unregister_device(&self, handle: &DeviceHandle) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if let Some(index) = state.devices.iter().position(|&a| a == handle.address) {
                state.devices.swap_remove(index);
            }
        });
    }
}

impl<M: RawMutex, I2C: I2c> I2cBus<M, I2C> {
    /// Reserve a logical device slot at `address`
    ///
    /// Fails if the address is already registered ([`Error::AddressInUse`]),
    /// the clock cannot be configured ([`Error::InvalidConfig`]) or the
    /// registry is full ([`Error::TooManyDevices`]).
    pub fn register_device(
        &self,
        address: SevenBitAddress,
        clock_hz: u32,
    ) -> Result<DeviceHandle, Error<I2C::Error>> {
        if clock_hz == 0 || clock_hz > MAX_BUS_CLOCK_HZ {
            return Err(Error::InvalidConfig);
        }
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if state.devices.contains(&address) {
                return Err(Error::AddressInUse(address));
            }
            state
                .devices
                .push(address)
                .map_err(|_| Error::TooManyDevices)?;
            Ok(DeviceHandle { address, clock_hz })
        })
    }

    /// Run one logical transaction with the bus lock held throughout
    ///
    /// Callers composing multi-step operations (trigger, then poll, then
    /// burst-read) wrap the whole sequence in a single call; the arbiter does
    /// not span the lock across separate calls. Blocks until the lock is
    /// free, with no timeout. Re-entrant acquisition from within the closure
    /// is a caller bug and panics.
    pub fn transaction<R>(&self, f: impl FnOnce(&mut BusTransaction<'_, I2C>) -> R) -> R {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            self.in_transaction.store(true, Ordering::Release);
            let mut bus = BusTransaction {
                i2c: &mut state.i2c,
            };
            let result = f(&mut bus);
            self.in_transaction.store(false, Ordering::Release);
            result
        })
    }

    /// Bounded-wait variant of [`I2cBus::transaction`]
    ///
    /// Returns [`Error::Busy`] when a transaction is already in progress,
    /// whether on another thread or re-entrantly from inside the current
    /// one, for callers that value responsiveness over completion (e.g.
    /// sharing the wire with interrupt-driven consumers). The check is a
    /// flag read before the lock, so a transaction that is concurrently
    /// starting can still be waited on for its duration.
    pub fn try_transaction<R>(
        &self,
        f: impl FnOnce(&mut BusTransaction<'_, I2C>) -> R,
    ) -> Result<R, Error<I2C::Error>> {
        if self.in_transaction.load(Ordering::Acquire) {
            return Err(Error::Busy);
        }
        self.state.lock(|state| match state.try_borrow_mut() {
            Ok(mut state) => {
                self.in_transaction.store(true, Ordering::Release);
                let mut bus = BusTransaction {
                    i2c: &mut state.i2c,
                };
                let result = f(&mut bus);
                self.in_transaction.store(false, Ordering::Release);
                Ok(result)
            }
            Err(_) => Err(Error::Busy),
        })
    }
}

/// Guarded register-level access to the bus, only obtainable while the bus
/// lock is held
pub struct BusTransaction<'bus, I2C> {
    i2c: &'bus mut I2C,
}

impl<I2C: I2c> BusTransaction<'_, I2C> {
    /// Single-register byte write
    pub fn write_register(
        &mut self,
        device: &DeviceHandle,
        register: u8,
        value: u8,
    ) -> Result<(), I2C::Error> {
        self.i2c.write(device.address(), &[register, value])
    }

    /// Burst read of `buffer.len()` bytes starting at `register`
    pub fn read_registers(
        &mut self,
        device: &DeviceHandle,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), I2C::Error> {
        self.i2c.write_read(device.address(), &[register], buffer)
    }
}
