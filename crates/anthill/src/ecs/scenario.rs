//! # Scenario: priority-ordered phase scheduler
//!
//! A [`Scenario`] owns a set of systems and drives them through nine
//! lifecycle phases. Each system is filed once, when added, into the phase
//! list of every capability it declares; each list stays sorted ascending by
//! priority so a phase call is a plain walk.
//!
//! ```text
//! Scenario
//!   ├── systems:  [Input(0), Physics(5), Render(10), Hud(10)]   backing list
//!   ├── phases[Execute]:       [Input(0), Physics(5), Hud(10)]
//!   ├── phases[ExecuteFixed]:  [Physics(5)]
//!   ├── phases[ExecuteLate]:   [Render(10)]
//!   └── queue: lock count + pending Add/Remove
//! ```
//!
//! ## Ordering
//!
//! Lower priority values run first. Equal priorities run in the order the
//! systems were added.
//!
//! ## Mutation during a phase
//!
//! Every phase call locks the scenario. Systems added or removed while it is
//! locked (typically from inside a phase method) are queued and applied in
//! request order right after the phase call completes. A system may remove
//! itself from its own `execute` without disturbing the walk.
//!
//! ## Nesting
//!
//! `Scenario` is a cheap handle and implements [`System`], so scenarios can be
//! added to other scenarios. A child keeps its own lock, queue and enabled
//! flag.
//!
//! ## Debug profiling
//!
//! With [`ScenarioConfig::debug`] set, every dispatched call is timed and the
//! totals are available through [`Scenario::profiles`].

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::deferred::{Change, DeferredQueue};
use super::priority::{insert_sorted, PriorityPair};
use super::system::{run_phase, Capabilities, Phase, System};
use crate::config::Config;

/// Scenario settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Name used in logs
    pub name: String,
    /// Time every system call and keep per-system profiles
    pub debug: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "scenario".to_string(),
            debug: false,
        }
    }
}

impl Config for ScenarioConfig {}

/// Accumulated timing of one system inside a debug scenario
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemProfile {
    /// System name
    pub name: String,
    /// Priority the system was added with
    pub priority: i32,
    /// Number of phase calls made
    pub calls: u64,
    /// Duration of the most recent call
    pub last: Duration,
    /// Sum of all call durations
    pub total: Duration,
}

impl SystemProfile {
    /// Mean duration per call
    pub fn average(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total / u32::try_from(self.calls).unwrap_or(u32::MAX)
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.calls += 1;
        self.last = elapsed;
        self.total += elapsed;
    }
}

/// A system as stored by the scenario: the same allocation seen as a system
/// and as `Any` for typed lookups.
#[derive(Clone)]
struct SystemEntry {
    system: Rc<RefCell<dyn System>>,
    any: Rc<dyn Any>,
    capabilities: Capabilities,
    profile: Rc<RefCell<SystemProfile>>,
}

impl SystemEntry {
    fn of<S: System>(system: Rc<RefCell<S>>, priority: i32) -> Self {
        let (capabilities, name) = {
            let borrowed = system.borrow();
            (borrowed.capabilities(), borrowed.name().to_owned())
        };
        let any: Rc<dyn Any> = system.clone();
        Self {
            system,
            any,
            capabilities,
            profile: Rc::new(RefCell::new(SystemProfile {
                name,
                priority,
                ..SystemProfile::default()
            })),
        }
    }

    /// Identity-only entry used to find a system for removal. Does not borrow
    /// the system, which may be running.
    fn key<S: System>(system: Rc<RefCell<S>>) -> Self {
        let any: Rc<dyn Any> = system.clone();
        Self {
            system,
            any,
            capabilities: Capabilities::empty(),
            profile: Rc::default(),
        }
    }

    fn is(&self, other: &Self) -> bool {
        Rc::as_ptr(&self.any).cast::<()>() == Rc::as_ptr(&other.any).cast::<()>()
    }

    /// Whether both entries come from the same `add` call. Each call gets its
    /// own profile, shared by every phase list it is filed into.
    fn same_registration(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.profile, &other.profile)
    }

    fn downcast<S: System>(&self) -> Option<Rc<RefCell<S>>> {
        Rc::clone(&self.any).downcast::<RefCell<S>>().ok()
    }

    fn name(&self) -> String {
        self.profile.borrow().name.clone()
    }
}

type Entry = PriorityPair<SystemEntry>;

struct ScenarioInner {
    name: String,
    debug: bool,
    systems: RefCell<Vec<Entry>>,
    phases: RefCell<[Vec<Entry>; 9]>,
    queue: DeferredQueue<Entry>,
    enabled: Cell<bool>,
}

/// Shared handle to a priority-ordered container of systems
#[derive(Clone)]
pub struct Scenario {
    inner: Rc<ScenarioInner>,
}

impl Scenario {
    /// Create a scenario without profiling
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(ScenarioConfig {
            name: name.into(),
            debug: false,
        })
    }

    /// Create a scenario that profiles every system call
    pub fn debug(name: impl Into<String>) -> Self {
        Self::with_config(ScenarioConfig {
            name: name.into(),
            debug: true,
        })
    }

    /// Create a scenario from settings
    pub fn with_config(config: ScenarioConfig) -> Self {
        Self {
            inner: Rc::new(ScenarioInner {
                name: config.name,
                debug: config.debug,
                systems: RefCell::new(Vec::new()),
                phases: RefCell::new(Default::default()),
                queue: DeferredQueue::new(),
                enabled: Cell::new(true),
            }),
        }
    }

    /// Scenario name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether per-tick phases currently run
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    /// Whether system calls are being profiled
    pub fn is_debug(&self) -> bool {
        self.inner.debug
    }

    /// Whether a phase call is in progress
    pub fn is_locked(&self) -> bool {
        self.inner.queue.is_locked()
    }

    /// Number of systems added so far (queued additions excluded)
    pub fn len(&self) -> usize {
        self.inner.systems.borrow().len()
    }

    /// Whether the scenario holds no system
    pub fn is_empty(&self) -> bool {
        self.inner.systems.borrow().is_empty()
    }

    /// Weak handle, for systems that need to reach their own scenario
    pub fn downgrade(&self) -> WeakScenario {
        WeakScenario {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same scenario
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ── Systems ─────────────────────────────────────────────────────

    /// Add a system with the given priority and return a handle to it
    pub fn add<S: System>(&self, system: S, priority: i32) -> Rc<RefCell<S>> {
        self.add_shared(Rc::new(RefCell::new(system)), priority)
    }

    /// Add a default-constructed system
    pub fn add_default<S: System + Default>(&self, priority: i32) -> Rc<RefCell<S>> {
        self.add(S::default(), priority)
    }

    /// Add a system the caller already shares
    ///
    /// The scenario does not reject a system that is already present.
    pub fn add_shared<S: System>(&self, system: Rc<RefCell<S>>, priority: i32) -> Rc<RefCell<S>> {
        let entry = PriorityPair::new(SystemEntry::of(Rc::clone(&system), priority), priority);
        self.submit(Change::Add(entry));
        system
    }

    /// Remove a system; a system that is not present is ignored
    pub fn remove<S: System>(&self, system: &Rc<RefCell<S>>) -> Rc<RefCell<S>> {
        let entry = PriorityPair::new(SystemEntry::key(Rc::clone(system)), 0);
        self.submit(Change::Remove(entry));
        Rc::clone(system)
    }

    /// Remove the first system of type `S`
    pub fn remove_type<S: System>(&self) -> Option<Rc<RefCell<S>>> {
        let system = self.get::<S>()?;
        Some(self.remove(&system))
    }

    /// First system of type `S`
    pub fn get<S: System>(&self) -> Option<Rc<RefCell<S>>> {
        self.inner
            .systems
            .borrow()
            .iter()
            .find_map(|pair| pair.system().downcast::<S>())
    }

    /// Whether a system of type `S` is present
    pub fn has<S: System>(&self) -> bool {
        self.get::<S>().is_some()
    }

    /// Names of the systems taking part in `phase`, in execution order
    pub fn systems_in(&self, phase: Phase) -> Vec<String> {
        self.inner.phases.borrow()[phase.index()]
            .iter()
            .map(|pair| pair.system().name())
            .collect()
    }

    /// Per-system timings, in the order systems were added.
    ///
    /// Empty counters unless the scenario was created with profiling.
    pub fn profiles(&self) -> Vec<SystemProfile> {
        self.inner
            .systems
            .borrow()
            .iter()
            .map(|pair| pair.system().profile.borrow().clone())
            .collect()
    }

    // ── Phases ──────────────────────────────────────────────────────

    /// Run [`Phase::Initialize`]
    pub fn initialize(&self) {
        self.dispatch(Phase::Initialize);
    }

    /// Run [`Phase::Deinitialize`]
    pub fn deinitialize(&self) {
        self.dispatch(Phase::Deinitialize);
    }

    /// Run [`Phase::Execute`]; no-op while disabled
    pub fn execute(&self) {
        self.dispatch(Phase::Execute);
    }

    /// Run [`Phase::ExecuteFixed`]; no-op while disabled
    pub fn execute_fixed(&self) {
        self.dispatch(Phase::ExecuteFixed);
    }

    /// Run [`Phase::ExecuteLate`]; no-op while disabled
    pub fn execute_late(&self) {
        self.dispatch(Phase::ExecuteLate);
    }

    /// Run [`Phase::Cleanup`]; no-op while disabled
    pub fn cleanup(&self) {
        self.dispatch(Phase::Cleanup);
    }

    /// Run [`Phase::Enable`], then resume per-tick phases
    pub fn enable(&self) {
        self.dispatch(Phase::Enable);
    }

    /// Run [`Phase::Disable`], then suspend per-tick phases
    pub fn disable(&self) {
        self.dispatch(Phase::Disable);
    }

    /// Run [`Phase::Reset`]
    pub fn reset(&self) {
        self.dispatch(Phase::Reset);
    }

    /// Run one phase over its systems, lowest priority first
    pub fn dispatch(&self, phase: Phase) {
        if phase.is_per_tick() && !self.is_enabled() {
            return;
        }

        let lock = DispatchLock::new(self);
        let len = self.inner.phases.borrow()[phase.index()].len();
        for index in 0..len {
            // The lock keeps the list still; the borrow must not outlive the lookup.
            let entry = self.inner.phases.borrow()[phase.index()]
                .get(index)
                .map(|pair| pair.system().clone());
            let Some(entry) = entry else { break };

            if self.inner.debug {
                let start = Instant::now();
                run_phase(&mut *entry.system.borrow_mut(), phase);
                entry.profile.borrow_mut().record(start.elapsed());
            } else {
                run_phase(&mut *entry.system.borrow_mut(), phase);
            }
        }

        match phase {
            Phase::Enable => self.inner.enabled.set(true),
            Phase::Disable => self.inner.enabled.set(false),
            _ => {}
        }

        drop(lock);
    }

    fn submit(&self, change: Change<Entry>) {
        if let Some(change) = self.inner.queue.submit(change) {
            self.apply(change);
        } else {
            log::trace!("{}: change queued until the current phase ends", self.inner.name);
        }
    }

    fn apply(&self, change: Change<Entry>) {
        match change {
            Change::Add(pair) => self.apply_add(pair),
            Change::Remove(pair) => self.apply_remove(pair.system()),
        }
    }

    fn apply_add(&self, pair: Entry) {
        let entry = pair.system().clone();
        self.inner.systems.borrow_mut().push(pair.clone());
        {
            let mut phases = self.inner.phases.borrow_mut();
            for phase in Phase::ALL {
                if entry.capabilities.contains(phase.capability()) {
                    insert_sorted(&mut phases[phase.index()], pair.clone());
                }
            }
        }

        log::debug!(
            "{}: added {} (priority {}, {:?})",
            self.inner.name,
            entry.name(),
            pair.priority(),
            entry.capabilities
        );
        entry.system.borrow_mut().added_to_engine();
    }

    fn apply_remove(&self, target: &SystemEntry) {
        let removed = {
            let mut systems = self.inner.systems.borrow_mut();
            systems
                .iter()
                .position(|pair| pair.system().is(target))
                .map(|index| systems.remove(index))
        };
        let Some(removed) = removed else {
            log::trace!("{}: ignoring removal of an absent system", self.inner.name);
            return;
        };

        let entry = removed.system();
        {
            // A system added twice keeps its other registration.
            let mut phases = self.inner.phases.borrow_mut();
            for list in phases.iter_mut() {
                if let Some(index) = list
                    .iter()
                    .position(|pair| pair.system().same_registration(entry))
                {
                    list.remove(index);
                }
            }
        }

        log::debug!("{}: removed {}", self.inner.name, entry.name());
        entry.system.borrow_mut().removed_from_engine();
    }
}

/// Holds a scenario's lock for one phase call. Releasing it applies the
/// queued changes, also when a system panics out of the walk.
struct DispatchLock<'a> {
    scenario: &'a Scenario,
}

impl<'a> DispatchLock<'a> {
    fn new(scenario: &'a Scenario) -> Self {
        scenario.inner.queue.lock();
        Self { scenario }
    }
}

impl Drop for DispatchLock<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            log::warn!("{}: phase call aborted by a panic", self.scenario.inner.name);
        }
        for change in self.scenario.inner.queue.unlock() {
            self.scenario.apply(change);
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::with_config(ScenarioConfig::default())
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.inner.name)
            .field("systems", &self.len())
            .field("enabled", &self.is_enabled())
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// Nested scenarios take part in every phase and forward it to their systems.
impl System for Scenario {
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    fn name(&self) -> &str {
        &self.inner.name
    }

    fn initialize(&mut self) {
        self.dispatch(Phase::Initialize);
    }

    fn deinitialize(&mut self) {
        self.dispatch(Phase::Deinitialize);
    }

    fn execute(&mut self) {
        self.dispatch(Phase::Execute);
    }

    fn execute_fixed(&mut self) {
        self.dispatch(Phase::ExecuteFixed);
    }

    fn execute_late(&mut self) {
        self.dispatch(Phase::ExecuteLate);
    }

    fn cleanup(&mut self) {
        self.dispatch(Phase::Cleanup);
    }

    fn enable(&mut self) {
        self.dispatch(Phase::Enable);
    }

    fn disable(&mut self) {
        self.dispatch(Phase::Disable);
    }

    fn reset(&mut self) {
        self.dispatch(Phase::Reset);
    }
}

/// Non-owning scenario handle
#[derive(Clone)]
pub struct WeakScenario {
    inner: Weak<ScenarioInner>,
}

impl WeakScenario {
    /// Recover the scenario if it is still alive
    pub fn upgrade(&self) -> Option<Scenario> {
        self.inner.upgrade().map(|inner| Scenario { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type CallLog = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        label: &'static str,
        capabilities: Capabilities,
        log: CallLog,
    }

    impl Recorder {
        fn new(label: &'static str, capabilities: Capabilities, log: &CallLog) -> Self {
            Self {
                label,
                capabilities,
                log: Rc::clone(log),
            }
        }

        fn note(&self, what: &str) {
            self.log.borrow_mut().push(format!("{}.{what}", self.label));
        }
    }

    impl System for Recorder {
        fn capabilities(&self) -> Capabilities {
            self.capabilities
        }

        fn name(&self) -> &str {
            self.label
        }

        fn added_to_engine(&mut self) {
            self.note("added");
        }

        fn removed_from_engine(&mut self) {
            self.note("removed");
        }

        fn initialize(&mut self) {
            self.note("initialize");
        }

        fn execute(&mut self) {
            self.note("execute");
        }

        fn execute_fixed(&mut self) {
            self.note("execute_fixed");
        }

        fn cleanup(&mut self) {
            self.note("cleanup");
        }

        fn enable(&mut self) {
            self.note("enable");
        }

        fn disable(&mut self) {
            self.note("disable");
        }
    }

    #[derive(Default)]
    struct Plain;

    impl System for Plain {
        fn capabilities(&self) -> Capabilities {
            Capabilities::EXECUTE
        }
    }

    fn take(log: &CallLog) -> Vec<String> {
        log.borrow_mut().drain(..).collect()
    }

    #[test]
    fn test_lower_priority_runs_first_and_ties_keep_insertion_order() {
        let log = CallLog::default();
        let scenario = Scenario::new("test");
        scenario.add(Recorder::new("late", Capabilities::EXECUTE, &log), 10);
        scenario.add(Recorder::new("first", Capabilities::EXECUTE, &log), -5);
        scenario.add(Recorder::new("tie_a", Capabilities::EXECUTE, &log), 3);
        scenario.add(Recorder::new("tie_b", Capabilities::EXECUTE, &log), 3);
        take(&log);

        scenario.execute();
        assert_eq!(
            take(&log),
            vec!["first.execute", "tie_a.execute", "tie_b.execute", "late.execute"]
        );
        assert_eq!(
            scenario.systems_in(Phase::Execute),
            vec!["first", "tie_a", "tie_b", "late"]
        );
    }

    #[test]
    fn test_systems_only_join_declared_phases() {
        let log = CallLog::default();
        let scenario = Scenario::new("test");
        scenario.add(Recorder::new("fixed", Capabilities::EXECUTE_FIXED, &log), 0);
        scenario.add(
            Recorder::new("both", Capabilities::EXECUTE | Capabilities::INITIALIZE, &log),
            1,
        );
        take(&log);

        scenario.initialize();
        scenario.execute();
        scenario.execute_fixed();
        scenario.reset();

        assert_eq!(
            take(&log),
            vec!["both.initialize", "both.execute", "fixed.execute_fixed"]
        );
        assert!(scenario.systems_in(Phase::Reset).is_empty());
    }

    #[test]
    fn test_get_has_and_remove_by_type() {
        let scenario = Scenario::new("test");
        assert!(!scenario.has::<Plain>());
        assert!(scenario.remove_type::<Plain>().is_none());

        let plain = scenario.add_default::<Plain>(0);
        assert!(Rc::ptr_eq(&scenario.get::<Plain>().unwrap(), &plain));

        let removed = scenario.remove_type::<Plain>().unwrap();
        assert!(Rc::ptr_eq(&removed, &plain));
        assert!(!scenario.has::<Plain>());
        assert!(scenario.is_empty());
        assert!(scenario.systems_in(Phase::Execute).is_empty());
    }

    #[test]
    fn test_removing_one_of_two_registrations_keeps_the_other() {
        let log = CallLog::default();
        let scenario = Scenario::new("test");
        let system = scenario.add(Recorder::new("twice", Capabilities::EXECUTE, &log), 0);
        scenario.add_shared(Rc::clone(&system), 5);
        take(&log);

        scenario.execute();
        assert_eq!(take(&log), vec!["twice.execute", "twice.execute"]);

        scenario.remove(&system);
        assert_eq!(take(&log), vec!["twice.removed"]);
        assert_eq!(scenario.len(), 1);
        assert!(scenario.has::<Recorder>());
        assert_eq!(scenario.systems_in(Phase::Execute), vec!["twice"]);
        assert_eq!(scenario.profiles()[0].priority, 5);

        scenario.execute();
        assert_eq!(take(&log), vec!["twice.execute"]);
    }

    /// Asks to be removed, then panics before the phase call completes
    struct Faulty {
        scenario: WeakScenario,
    }

    impl System for Faulty {
        fn capabilities(&self) -> Capabilities {
            Capabilities::EXECUTE
        }

        fn execute(&mut self) {
            if let Some(scenario) = self.scenario.upgrade() {
                scenario.remove_type::<Self>();
            }
            panic!("faulty system");
        }
    }

    #[test]
    fn test_panicking_system_releases_the_lock() {
        let scenario = Scenario::new("test");
        scenario.add(
            Faulty {
                scenario: scenario.downgrade(),
            },
            0,
        );

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            scenario.execute();
        }));
        assert!(outcome.is_err());
        assert!(!scenario.is_locked());
        assert!(!scenario.has::<Faulty>(), "queued removal still applied");

        scenario.add_default::<Plain>(1);
        assert_eq!(scenario.len(), 1);
        scenario.execute();
    }

    #[test]
    fn test_hooks_fire_once_and_absent_removal_is_ignored() {
        let log = CallLog::default();
        let scenario = Scenario::new("test");
        let system = scenario.add(Recorder::new("sys", Capabilities::EXECUTE, &log), 0);

        scenario.remove(&system);
        scenario.remove(&system);

        assert_eq!(take(&log), vec!["sys.added", "sys.removed"]);
    }

    /// Removes itself from its scenario the first time it executes
    struct SelfRemoving {
        scenario: WeakScenario,
        log: CallLog,
    }

    impl System for SelfRemoving {
        fn capabilities(&self) -> Capabilities {
            Capabilities::EXECUTE
        }

        fn removed_from_engine(&mut self) {
            self.log.borrow_mut().push("self.removed".into());
        }

        fn execute(&mut self) {
            self.log.borrow_mut().push("self.execute".into());
            if let Some(scenario) = self.scenario.upgrade() {
                assert!(scenario.remove_type::<Self>().is_some());
                assert!(scenario.is_locked());
                assert!(scenario.has::<Self>(), "removal waits for the phase to end");
            }
        }
    }

    #[test]
    fn test_self_removal_is_deferred_until_phase_ends() {
        let log = CallLog::default();
        let scenario = Scenario::new("test");
        scenario.add(
            SelfRemoving {
                scenario: scenario.downgrade(),
                log: Rc::clone(&log),
            },
            0,
        );
        scenario.add(Recorder::new("after", Capabilities::EXECUTE, &log), 1);
        take(&log);

        scenario.execute();
        assert_eq!(
            take(&log),
            vec!["self.execute", "after.execute", "self.removed"]
        );

        scenario.execute();
        assert_eq!(take(&log), vec!["after.execute"]);
    }

    /// Adds a sibling the first time it executes
    struct Spawner {
        scenario: WeakScenario,
        log: CallLog,
        spawned: bool,
    }

    impl System for Spawner {
        fn capabilities(&self) -> Capabilities {
            Capabilities::EXECUTE
        }

        fn execute(&mut self) {
            if self.spawned {
                return;
            }
            self.spawned = true;
            if let Some(scenario) = self.scenario.upgrade() {
                scenario.add(Recorder::new("child", Capabilities::EXECUTE, &self.log), -1);
                assert_eq!(scenario.len(), 1);
            }
        }
    }

    #[test]
    fn test_add_during_phase_applies_after_it() {
        let log = CallLog::default();
        let scenario = Scenario::new("test");
        scenario.add(
            Spawner {
                scenario: scenario.downgrade(),
                log: Rc::clone(&log),
                spawned: false,
            },
            0,
        );

        scenario.execute();
        assert_eq!(take(&log), vec!["child.added"]);

        scenario.execute();
        assert_eq!(take(&log), vec!["child.execute"]);
        assert_eq!(scenario.len(), 2);
    }

    #[test]
    fn test_disable_gates_per_tick_phases() {
        let log = CallLog::default();
        let scenario = Scenario::new("test");
        let all = Capabilities::EXECUTE
            | Capabilities::EXECUTE_FIXED
            | Capabilities::CLEANUP
            | Capabilities::INITIALIZE
            | Capabilities::ENABLE
            | Capabilities::DISABLE;
        scenario.add(Recorder::new("sys", all, &log), 0);
        take(&log);

        scenario.disable();
        assert!(!scenario.is_enabled());
        scenario.execute();
        scenario.execute_fixed();
        scenario.execute_late();
        scenario.cleanup();
        scenario.initialize();
        assert_eq!(take(&log), vec!["sys.disable", "sys.initialize"]);

        scenario.enable();
        scenario.execute();
        assert_eq!(take(&log), vec!["sys.enable", "sys.execute"]);
    }

    #[test]
    fn test_nested_scenario_runs_inside_parent() {
        let log = CallLog::default();
        let parent = Scenario::new("parent");
        let child = Scenario::new("child");
        child.add(Recorder::new("inner", Capabilities::EXECUTE, &log), 0);

        parent.add(Recorder::new("before", Capabilities::EXECUTE, &log), 0);
        parent.add(child.clone(), 1);
        parent.add(Recorder::new("after", Capabilities::EXECUTE, &log), 2);
        take(&log);

        parent.execute();
        assert_eq!(
            take(&log),
            vec!["before.execute", "inner.execute", "after.execute"]
        );

        child.disable();
        parent.execute();
        assert_eq!(take(&log), vec!["before.execute", "after.execute"]);
        assert!(parent.get::<Scenario>().unwrap().borrow().ptr_eq(&child));
    }

    #[test]
    fn test_debug_scenario_profiles_calls() {
        let log = CallLog::default();
        let scenario = Scenario::debug("profiled");
        scenario.add(Recorder::new("sys", Capabilities::EXECUTE, &log), 4);

        for _ in 0..3 {
            scenario.execute();
        }

        let profiles = scenario.profiles();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "sys");
        assert_eq!(profiles[0].priority, 4);
        assert_eq!(profiles[0].calls, 3);
        assert!(profiles[0].average() <= profiles[0].total);
    }

    #[test]
    fn test_plain_scenario_does_not_profile() {
        let scenario = Scenario::new("plain");
        scenario.add_default::<Plain>(0);
        scenario.execute();
        assert_eq!(scenario.profiles()[0].calls, 0);
        assert!(!scenario.is_debug());
    }

    #[test]
    fn test_config_from_toml() {
        let config = ScenarioConfig::from_toml_str("name = \"gameplay\"\ndebug = true").unwrap();
        let scenario = Scenario::with_config(config);
        assert_eq!(scenario.name(), "gameplay");
        assert!(scenario.is_debug());
    }
}
