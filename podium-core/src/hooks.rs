// Lifecycle phases and the boot-time hook binding table

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// The five dispatch phases, run in order. A failure in any phase stops the
/// request; later phases do not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Initial,
    PreShow,
    Show,
    PostShow,
    Final,
}

impl Phase {
    /// All phases, in dispatch order.
    pub const ALL: [Phase; 5] = [
        Phase::Initial,
        Phase::PreShow,
        Phase::Show,
        Phase::PostShow,
        Phase::Final,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Initial => "initial",
            Phase::PreShow => "pre_show",
            Phase::Show => "show",
            Phase::PostShow => "post_show",
            Phase::Final => "final",
        }
    }

    /// Parse a phase from its config spelling.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "initial" => Some(Phase::Initial),
            "pre_show" => Some(Phase::PreShow),
            "show" => Some(Phase::Show),
            "post_show" => Some(Phase::PostShow),
            "final" => Some(Phase::Final),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form parameters handed to a hook at invocation.
pub type HookParams = HashMap<String, String>;

/// A free-function hook. Returns an advisory success flag.
pub type HookFn =
    Arc<dyn Fn(HookParams) -> Pin<Box<dyn Future<Output = bool> + Send>> + Send + Sync>;

/// A stateful hook, instantiated fresh for every invocation.
#[async_trait::async_trait]
pub trait LifecycleHook: Send + Sync {
    async fn call(&self, params: HookParams) -> bool;
}

/// Constructor for a [`LifecycleHook`].
pub type HookFactory = Arc<dyn Fn() -> Box<dyn LifecycleHook> + Send + Sync>;

/// How a configured hook entry invokes its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    /// Call a registered function.
    Exec,
    /// Instantiate a registered hook type and call it.
    New,
}

impl HookKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "exec" => Some(HookKind::Exec),
            "new" => Some(HookKind::New),
            _ => None,
        }
    }
}

/// One configured hook: which phase, which registered target, with what
/// parameters, and whether it is currently enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct HookConfigEntry {
    pub phase: Phase,
    pub kind: HookKind,
    pub target: String,
    pub params: HookParams,
    pub enabled: bool,
}

enum BoundTarget {
    Exec(HookFn),
    New(HookFactory),
}

struct BoundHook {
    target: BoundTarget,
    name: String,
    params: HookParams,
    enabled: bool,
}

/// Hook table: named targets registered in code, bound to phases by config.
///
/// Targets must be registered before [`bind`](Self::bind) runs; an enabled
/// entry naming an unknown target is a boot error, a disabled one is skipped.
/// Hook return values are advisory and never stop the request.
#[derive(Default)]
pub struct HookRegistry {
    exec: HashMap<String, HookFn>,
    new: HashMap<String, HookFactory>,
    bound: HashMap<Phase, Vec<BoundHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function target under `name`.
    pub fn register_exec<F, Fut>(&mut self, name: impl Into<String>, hook: F)
    where
        F: Fn(HookParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.exec.insert(
            name.into(),
            Arc::new(move |params| {
                Box::pin(hook(params)) as Pin<Box<dyn Future<Output = bool> + Send>>
            }),
        );
    }

    /// Register an instantiable hook type under `name`.
    pub fn register_new<F, H>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: LifecycleHook + 'static,
    {
        self.new.insert(
            name.into(),
            Arc::new(move || Box::new(factory()) as Box<dyn LifecycleHook>),
        );
    }

    /// Bind configured entries to their registered targets.
    pub fn bind(&mut self, entries: &[HookConfigEntry]) -> Result<()> {
        for entry in entries {
            let target = match entry.kind {
                HookKind::Exec => self
                    .exec
                    .get(&entry.target)
                    .cloned()
                    .map(BoundTarget::Exec),
                HookKind::New => self.new.get(&entry.target).cloned().map(BoundTarget::New),
            };
            let Some(target) = target else {
                if entry.enabled {
                    return Err(Error::HookBinding(format!(
                        "no registered hook target {:?} for phase {}",
                        entry.target, entry.phase
                    )));
                }
                log::debug!(
                    "skipping disabled hook {:?} with no registered target",
                    entry.target
                );
                continue;
            };
            self.bound.entry(entry.phase).or_default().push(BoundHook {
                target,
                name: entry.target.clone(),
                params: entry.params.clone(),
                enabled: entry.enabled,
            });
        }
        Ok(())
    }

    /// Number of hooks bound to `phase`, disabled entries included.
    pub fn bound_count(&self, phase: Phase) -> usize {
        self.bound.get(&phase).map_or(0, Vec::len)
    }

    /// Run every enabled hook bound to `phase`, in binding order.
    pub async fn run_phase(&self, phase: Phase) {
        let Some(hooks) = self.bound.get(&phase) else {
            return;
        };
        for hook in hooks {
            if !hook.enabled {
                continue;
            }
            let ok = match &hook.target {
                BoundTarget::Exec(func) => func(hook.params.clone()).await,
                BoundTarget::New(factory) => factory().call(hook.params.clone()).await,
            };
            if !ok {
                log::debug!("hook {:?} reported failure in phase {phase}", hook.name);
            }
        }
    }
}
