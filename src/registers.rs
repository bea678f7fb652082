//! Register definitions for the BMP280/BME280
//!
//! The map is fixed by hardware (Bosch datasheet BST-BMP280-DS001, section 4):
//! identity and reset live at 0xD0/0xE0, the control and status registers at
//! 0xF3..0xF5, and the 6-byte measurement burst starts at `PRESS_MSB` (0xF7).
//! The 24-byte calibration block at 0x88..0xA1 and the measurement burst are
//! read through the raw interface rather than as individual registers, since
//! both must be fetched in a single auto-incrementing read.

device_driver::create_device!(
    device_name: Bmp280,
    dsl: {
        config {
            type RegisterAddressType = u8;
            type DefaultByteOrder = LE;
        }

        /// ID - Chip identification (0xD0)
        /// Expected value: 0x58 (BMP280) or 0x60 (BME280)
        register Id {
            const ADDRESS = 0xD0;
            const SIZE_BITS = 8;

            /// Chip identity
            chip_id: uint = 0..8,
        },

        /// RESET - Soft reset (0xE0)
        /// Writing 0xB6 triggers the complete power-on-reset procedure
        register Reset {
            const ADDRESS = 0xE0;
            const SIZE_BITS = 8;

            /// Reset command; only 0xB6 has an effect
            reset: uint = 0..8,
        },

        /// STATUS - Conversion status (0xF3)
        register Status {
            const ADDRESS = 0xF3;
            const SIZE_BITS = 8;

            /// NVM data is being copied to image registers
            im_update: bool = 0,
            reserved_2_1: uint = 1..3,
            /// A conversion is in progress; clears when results are ready
            measuring: bool = 3,
            reserved_7_4: uint = 4..8,
        },

        /// CTRL_MEAS - Measurement control (0xF4)
        register CtrlMeas {
            const ADDRESS = 0xF4;
            const SIZE_BITS = 8;

            /// Power mode (00 sleep, 01/10 forced, 11 normal)
            mode: uint = 0..2,
            /// Pressure oversampling
            osrs_p: uint = 2..5,
            /// Temperature oversampling
            osrs_t: uint = 5..8,
        },

        /// CONFIG - Rate, filter and interface options (0xF5)
        register Config {
            const ADDRESS = 0xF5;
            const SIZE_BITS = 8;

            /// Enable 3-wire SPI interface
            spi3w_en: bool = 0,
            reserved_1: uint = 1..2,
            /// IIR filter time constant
            filter: uint = 2..5,
            /// Standby time in normal mode
            t_sb: uint = 5..8,
        },
    }
);
