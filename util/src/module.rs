//! Module interfaces
//!
//! Stateful arm modules are driven in cycles: initialised once from their
//! parameters, then handed one input per cycle. Anything which can move the
//! arm also knows how to put it back into a safe condition.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A cyclically processed module.
pub trait State {
    /// Data required during initialisation, usually a parameter file name.
    type InitData;
    type InitError;

    type InputData;
    type OutputData;
    type StatusReport;
    type ProcError;

    /// Initialise the module.
    ///
    /// Modules which archive their state only do so when `session` is given,
    /// so they can be initialised in tests and offline tools without one.
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: Option<&Session>,
    ) -> Result<(), Self::InitError>;

    /// Process one cycle.
    ///
    /// On error the module's state must be the same as before the call.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}

/// A module which can be forced into a safe condition.
pub trait Safe {
    /// Abandon any activity in progress and return to the safe condition.
    ///
    /// Cannot fail. A module unable to reach its safe condition shall log the
    /// reason and stay where it is.
    fn make_safe(&mut self);
}

#[cfg(test)]
mod test {
    use super::*;

    /// Counter which refuses to go past a limit.
    #[derive(Default)]
    struct Counter {
        limit: u32,
        count: u32,
    }

    impl State for Counter {
        type InitData = u32;
        type InitError = ();

        type InputData = u32;
        type OutputData = u32;
        type StatusReport = bool;
        type ProcError = u32;

        fn init(&mut self, limit: u32, _: Option<&Session>) -> Result<(), ()> {
            *self = Self { limit, count: 0 };
            Ok(())
        }

        fn proc(&mut self, step: &u32) -> Result<(u32, bool), u32> {
            let next = self.count + step;
            if next > self.limit {
                return Err(next);
            }

            self.count = next;
            Ok((self.count, self.count == self.limit))
        }
    }

    impl Safe for Counter {
        fn make_safe(&mut self) {
            self.count = 0;
        }
    }

    #[test]
    fn test_cycle_and_make_safe() {
        let mut c = Counter::default();
        c.init(5, None).unwrap();

        assert_eq!(c.proc(&3), Ok((3, false)));
        assert_eq!(c.proc(&3), Err(6));
        assert_eq!(c.count, 3);
        assert_eq!(c.proc(&2), Ok((5, true)));

        c.make_safe();
        assert_eq!(c.count, 0);
    }
}
