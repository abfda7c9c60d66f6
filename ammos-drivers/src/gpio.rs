//! GPIO pin abstraction
//!
//! Drivers in this crate talk to pins through a minimal infallible
//! trait so they can be unit-tested with plain mock structs. `HalPin`
//! adapts any `embedded_hal` output pin to it; on the RP2040 the pin
//! operations cannot fail, so errors are discarded.

/// Trait for GPIO pin abstraction
pub trait OutputPin {
    /// Set the pin high
    fn set_high(&mut self);

    /// Set the pin low
    fn set_low(&mut self);

    /// Check if the pin is set high
    fn is_set_high(&self) -> bool;
}

/// Adapter from an `embedded_hal` output pin to [`OutputPin`]
pub struct HalPin<P> {
    pin: P,
    high: bool,
}

impl<P: embedded_hal::digital::OutputPin> HalPin<P> {
    /// Wrap an embedded-hal pin, driving it low initially
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin, high: false }
    }
}

impl<P: embedded_hal::digital::OutputPin> OutputPin for HalPin<P> {
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
