use std::{num::NonZeroU32, time::Duration};

use esp_idf_svc::{
    hal::{
        delay::{Ets, TickType},
        gpio::{AnyInputPin, AnyOutputPin, Input, InterruptType, Output, PinDriver, Pull},
        task::notification::Notification,
    },
    sys::esp_timer_get_time,
};

use super::rc_lines::{EdgeWait, RcLines};

pub struct EspRcLines<'a> {
    pin_control: PinDriver<'a, AnyOutputPin, Output>,
    pin_measure: PinDriver<'a, AnyInputPin, Input>,
    notification: Notification,
}

impl<'a> EspRcLines<'a> {
    pub fn new(pin_control: AnyOutputPin, pin_measure: AnyInputPin) -> anyhow::Result<Self> {
        let mut s = Self {
            pin_control: PinDriver::output(pin_control)?,
            pin_measure: PinDriver::input(pin_measure)?,
            notification: Notification::new(),
        };

        s.pin_control.set_low()?;
        s.pin_measure.set_pull(Pull::Up)?;
        s.pin_measure.set_interrupt_type(InterruptType::NegEdge)?;

        let notifier = s.notification.notifier();

        // The callback runs in ISR context and only touches the notifier.
        unsafe {
            s.pin_measure.subscribe(move || {
                notifier.notify_and_yield(NonZeroU32::MIN);
            })?;
        }

        Ok(s)
    }

    /// Open the lines from raw GPIO numbers, as stored in the NVS configuration.
    ///
    /// # Safety
    ///
    /// The caller must not hold any other driver on these two GPIOs.
    pub unsafe fn from_gpio_numbers(pin_control: u8, pin_measure: u8) -> anyhow::Result<Self> {
        Self::new(
            AnyOutputPin::new(pin_control as i32),
            AnyInputPin::new(pin_measure as i32),
        )
    }
}

impl<'a> RcLines for EspRcLines<'a> {
    fn set_control(&mut self, active: bool) -> anyhow::Result<()> {
        if active {
            self.pin_control.set_high()?;
        } else {
            self.pin_control.set_low()?;
        }
        Ok(())
    }

    fn delay(&mut self, duration: Duration) {
        // busy wait, a FreeRTOS delay would round the pulse up to a tick
        Ets::delay_us(u32::try_from(duration.as_micros()).unwrap_or(u32::MAX));
    }

    fn wait_falling_edge(&mut self, timeout: Duration) -> anyhow::Result<EdgeWait> {
        // drop a notification left over from an edge seen after the last timeout
        self.notification.wait(0);

        self.pin_measure.enable_interrupt()?;

        match self.notification.wait(TickType::from(timeout).ticks()) {
            Some(_) => Ok(EdgeWait::Edge),
            None => {
                self.pin_measure.disable_interrupt()?;
                Ok(EdgeWait::Timeout)
            }
        }
    }

    fn now(&self) -> Duration {
        let micros = unsafe { esp_timer_get_time() };
        Duration::from_micros(micros.max(0) as u64)
    }

    fn release(&mut self) -> anyhow::Result<()> {
        self.pin_control.set_low()?;
        self.pin_measure.disable_interrupt()?;
        Ok(())
    }
}
