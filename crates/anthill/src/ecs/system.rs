//! System trait and lifecycle phases

use bitflags::bitflags;

use super::component::short_type_name;

bitflags! {
    /// Lifecycle phases a system takes part in
    ///
    /// Checked once, when the system is added to a scenario; the system is then
    /// filed into the phase list of every capability it declares.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u16 {
        /// Runs [`System::initialize`]
        const INITIALIZE = 1 << 0;
        /// Runs [`System::deinitialize`]
        const DEINITIALIZE = 1 << 1;
        /// Runs [`System::execute`]
        const EXECUTE = 1 << 2;
        /// Runs [`System::execute_fixed`]
        const EXECUTE_FIXED = 1 << 3;
        /// Runs [`System::execute_late`]
        const EXECUTE_LATE = 1 << 4;
        /// Runs [`System::cleanup`]
        const CLEANUP = 1 << 5;
        /// Runs [`System::enable`]
        const ENABLE = 1 << 6;
        /// Runs [`System::disable`]
        const DISABLE = 1 << 7;
        /// Runs [`System::reset`]
        const RESET = 1 << 8;
    }
}

/// One of the nine lifecycle phases driven by a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Once, before the first tick
    Initialize,
    /// Once, at shutdown
    Deinitialize,
    /// Every variable-rate tick
    Execute,
    /// Every fixed-rate tick
    ExecuteFixed,
    /// Every tick, after `Execute`
    ExecuteLate,
    /// Every tick, after everything else
    Cleanup,
    /// When the scenario is enabled
    Enable,
    /// When the scenario is disabled
    Disable,
    /// When the scenario is reset
    Reset,
}

impl Phase {
    /// Every phase, in declaration order
    pub const ALL: [Self; 9] = [
        Self::Initialize,
        Self::Deinitialize,
        Self::Execute,
        Self::ExecuteFixed,
        Self::ExecuteLate,
        Self::Cleanup,
        Self::Enable,
        Self::Disable,
        Self::Reset,
    ];

    /// Capability a system needs to take part in this phase
    pub const fn capability(self) -> Capabilities {
        match self {
            Self::Initialize => Capabilities::INITIALIZE,
            Self::Deinitialize => Capabilities::DEINITIALIZE,
            Self::Execute => Capabilities::EXECUTE,
            Self::ExecuteFixed => Capabilities::EXECUTE_FIXED,
            Self::ExecuteLate => Capabilities::EXECUTE_LATE,
            Self::Cleanup => Capabilities::CLEANUP,
            Self::Enable => Capabilities::ENABLE,
            Self::Disable => Capabilities::DISABLE,
            Self::Reset => Capabilities::RESET,
        }
    }

    /// Per-tick phases are skipped while their scenario is disabled
    pub const fn is_per_tick(self) -> bool {
        matches!(
            self,
            Self::Execute | Self::ExecuteFixed | Self::ExecuteLate | Self::Cleanup
        )
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// A unit of behaviour driven by a [`Scenario`](super::Scenario)
///
/// Only the phase methods whose capability is declared by
/// [`capabilities`](Self::capabilities) are ever called. Systems that need
/// the engine should receive an [`Engine`](crate::Engine) (or a
/// [`WeakEngine`](crate::WeakEngine)) when they are constructed.
pub trait System: 'static {
    /// Phases this system takes part in
    fn capabilities(&self) -> Capabilities;

    /// Name used in logs and profiles
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Called once when the system enters a scenario
    fn added_to_engine(&mut self) {}

    /// Called once when the system leaves a scenario
    fn removed_from_engine(&mut self) {}

    /// [`Phase::Initialize`]
    fn initialize(&mut self) {}

    /// [`Phase::Deinitialize`]
    fn deinitialize(&mut self) {}

    /// [`Phase::Execute`]
    fn execute(&mut self) {}

    /// [`Phase::ExecuteFixed`]
    fn execute_fixed(&mut self) {}

    /// [`Phase::ExecuteLate`]
    fn execute_late(&mut self) {}

    /// [`Phase::Cleanup`]
    fn cleanup(&mut self) {}

    /// [`Phase::Enable`]
    fn enable(&mut self) {}

    /// [`Phase::Disable`]
    fn disable(&mut self) {}

    /// [`Phase::Reset`]
    fn reset(&mut self) {}
}

/// Invoke the method of `system` belonging to `phase`
pub(crate) fn run_phase(system: &mut dyn System, phase: Phase) {
    match phase {
        Phase::Initialize => system.initialize(),
        Phase::Deinitialize => system.deinitialize(),
        Phase::Execute => system.execute(),
        Phase::ExecuteFixed => system.execute_fixed(),
        Phase::ExecuteLate => system.execute_late(),
        Phase::Cleanup => system.cleanup(),
        Phase::Enable => system.enable(),
        Phase::Disable => system.disable(),
        Phase::Reset => system.reset(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        calls: Vec<Phase>,
    }

    impl System for Counter {
        fn capabilities(&self) -> Capabilities {
            Capabilities::all()
        }

        fn execute(&mut self) {
            self.calls.push(Phase::Execute);
        }

        fn reset(&mut self) {
            self.calls.push(Phase::Reset);
        }
    }

    #[test]
    fn test_phase_capability_mapping_is_one_to_one() {
        let mut seen = Capabilities::empty();
        for phase in Phase::ALL {
            assert!(!seen.intersects(phase.capability()));
            seen |= phase.capability();
            assert_eq!(Phase::ALL[phase.index()], phase);
        }
        assert_eq!(seen, Capabilities::all());
    }

    #[test]
    fn test_run_phase_dispatches() {
        let mut counter = Counter::default();
        for phase in Phase::ALL {
            run_phase(&mut counter, phase);
        }
        assert_eq!(counter.calls, vec![Phase::Execute, Phase::Reset]);
    }

    #[test]
    fn test_default_name_is_short_type_name() {
        assert_eq!(Counter::default().name(), "Counter");
    }
}
