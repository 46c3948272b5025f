//! Demo targets used by the CLI and the end-to-end tests. `Creature` exercises
//! every parameter kind and outcome; `Beacon` is a second type sharing a few
//! of its signatures.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::PanelError;
use crate::executor::{DeferredExecutor, DeferredSequence, Step};
use crate::model::{Color, ObjectRef, ParamKind, Quat, Vec3};
use crate::registry::{CommandSignature, OperationDescriptor, Parameter};
use crate::target::{Args, FieldView, Invocable, Outcome};

const REGEN_TICK: Duration = Duration::from_millis(10);

const NAMES: [&str; 6] = ["Goblin", "Troll", "Imp", "Ogre", "Wisp", "Kobold"];

// ── Creature ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CreatureStatus {
    pub name: String,
    pub health: f32,
    pub position: Vec3,
}

pub struct Creature {
    id: u64,
    name: String,
    /// Shared with running regeneration jobs.
    health: Arc<Mutex<f32>>,
    tint: Color,
    position: Vec3,
    facing: Quat,
    leader: Option<ObjectRef>,
    stunned: bool,
    executor: Arc<dyn DeferredExecutor>,
}

impl Creature {
    pub fn new(id: u64, name: impl Into<String>, executor: Arc<dyn DeferredExecutor>) -> Self {
        Self {
            id,
            name: name.into(),
            health: Arc::new(Mutex::new(100.0)),
            tint: Color::WHITE,
            position: Vec3::ZERO,
            facing: Quat::IDENTITY,
            leader: None,
            stunned: false,
            executor,
        }
    }

    /// A stunned creature fails every operation.
    pub fn stunned(mut self) -> Self {
        self.stunned = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn health(&self) -> f32 {
        *self.health.lock()
    }

    pub fn tint(&self) -> Color {
        self.tint
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn facing(&self) -> Quat {
        self.facing
    }

    pub fn leader(&self) -> Option<&ObjectRef> {
        self.leader.as_ref()
    }

    pub fn reference(&self) -> ObjectRef {
        ObjectRef {
            id: self.id,
            type_name: "Creature".to_string(),
            name: self.name.clone(),
        }
    }

    pub fn status(&self) -> CreatureStatus {
        CreatureStatus {
            name: self.name.clone(),
            health: self.health(),
            position: self.position,
        }
    }

    fn regenerate(&self, ticks: i32, per_tick: f32) -> DeferredSequence {
        let health = Arc::clone(&self.health);
        let mut remaining = ticks.max(0);
        DeferredSequence::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            *health.lock() += per_tick;
            Some(Step::Wait(REGEN_TICK))
        })
    }
}

impl Invocable for Creature {
    fn type_name(&self) -> &str {
        "Creature"
    }

    fn label(&self) -> String {
        format!("{} #{}", self.name, self.id)
    }

    fn operations(&self) -> Vec<OperationDescriptor> {
        vec![
            OperationDescriptor::new("heal")
                .describe("Restore health")
                .param(Parameter::new("amount", ParamKind::Float).with_default(10)),
            OperationDescriptor::new("rename").param(Parameter::new("to", ParamKind::Text)),
            OperationDescriptor::new("tint")
                .describe("Recolour the creature")
                .param(Parameter::new("color", ParamKind::Color).with_default(Color::WHITE)),
            OperationDescriptor::new("teleport").param(Parameter::new("to", ParamKind::Vector3)),
            OperationDescriptor::new("teleport")
                .describe("Move on the ground plane, keeping height")
                .param(Parameter::new("to", ParamKind::Vector2)),
            OperationDescriptor::new("face").param(Parameter::new("rotation", ParamKind::Rotation)),
            OperationDescriptor::new("follow")
                .param(Parameter::new("leader", ParamKind::object("Creature"))),
            OperationDescriptor::new("regenerate")
                .describe("Regain health over time")
                .param(Parameter::new("ticks", ParamKind::Int).with_default(5))
                .param(Parameter::new("per_tick", ParamKind::Float).with_default(1)),
            OperationDescriptor::new("status").describe("Report name, health and position"),
            OperationDescriptor::new("explode"),
            OperationDescriptor::new("stash")
                .param(Parameter::new("items", ParamKind::unsupported("HashMap<String, Item>"))),
        ]
    }

    fn invoke(&mut self, signature: &CommandSignature, args: Args<'_>) -> Result<Outcome, PanelError> {
        if self.stunned {
            return Err(PanelError::invocation(format!("{} is stunned", self.name)));
        }
        match signature.name() {
            "heal" => {
                *self.health.lock() += args.float(0)?;
            }
            "rename" => {
                let to = args.text(0)?.trim();
                if to.is_empty() {
                    return Err(PanelError::InvalidValue {
                        message: "name must not be empty".to_string(),
                    });
                }
                self.name = to.to_string();
            }
            "tint" => self.tint = args.color(0)?,
            "teleport" => {
                self.position = if signature.params == [ParamKind::Vector2] {
                    let ground = args.vector2(0)?;
                    Vec3::new(ground.x, ground.y, self.position.z)
                } else {
                    args.vector3(0)?
                };
            }
            "face" => self.facing = args.rotation(0)?,
            "follow" => self.leader = args.object(0)?.cloned(),
            "regenerate" => {
                return Ok(Outcome::Deferred(self.regenerate(args.int(0)?, args.float(1)?)));
            }
            "status" => return Ok(Outcome::value(self.status())),
            "explode" => {
                return Err(PanelError::invocation(format!("{} refuses to explode", self.name)));
            }
            "stash" => return Ok(Outcome::value("nothing to stash")),
            other => {
                return Err(PanelError::UnknownCommand {
                    name: other.to_string(),
                })
            }
        }
        Ok(Outcome::Empty)
    }

    fn start_deferred(&mut self, sequence: DeferredSequence) {
        self.executor.spawn(&self.label(), sequence);
    }

    fn read_only_fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::new("health", self.health()),
            FieldView::new("position", self.position),
        ]
    }
}

// ── Beacon ───────────────────────────────────────────────────────

pub struct Beacon {
    name: String,
    color: Color,
    position: Vec3,
    lit: bool,
}

impl Beacon {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Color::rgb(255, 160, 0),
            position: Vec3::ZERO,
            lit: false,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl Invocable for Beacon {
    fn type_name(&self) -> &str {
        "Beacon"
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn operations(&self) -> Vec<OperationDescriptor> {
        vec![
            OperationDescriptor::new("status"),
            OperationDescriptor::new("tint")
                .param(Parameter::new("color", ParamKind::Color).with_default(Color::WHITE)),
            OperationDescriptor::new("teleport").param(Parameter::new("to", ParamKind::Vector3)),
            OperationDescriptor::new("light").param(Parameter::new("on", ParamKind::Bool)),
        ]
    }

    fn invoke(&mut self, signature: &CommandSignature, args: Args<'_>) -> Result<Outcome, PanelError> {
        match signature.name() {
            "status" => {
                return Ok(Outcome::value(serde_json::json!({
                    "name": self.name,
                    "lit": self.lit,
                })))
            }
            "tint" => self.color = args.color(0)?,
            "teleport" => self.position = args.vector3(0)?,
            "light" => self.lit = args.bool(0)?,
            other => {
                return Err(PanelError::UnknownCommand {
                    name: other.to_string(),
                })
            }
        }
        Ok(Outcome::Empty)
    }

    fn start_deferred(&mut self, _: DeferredSequence) {
        tracing::warn!(beacon = %self.name, "beacons do not run deferred jobs");
    }
}

/// `count` creatures with distinct names. The creature at `stunned`, if any,
/// fails every operation.
pub fn create_demo_creatures(
    count: usize,
    stunned: Option<usize>,
    executor: &Arc<dyn DeferredExecutor>,
) -> Vec<Creature> {
    (0..count)
        .map(|i| {
            let base = NAMES.get(i % NAMES.len()).copied().unwrap_or("Creature");
            let id = u64::try_from(i + 1).unwrap_or(u64::MAX);
            let creature = Creature::new(id, base, Arc::clone(executor));
            if stunned == Some(i) {
                creature.stunned()
            } else {
                creature
            }
        })
        .collect()
}
