//! Skill progression: every five recorded actions is one level, capped at five.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub const MAX_SKILL_LEVEL: u32 = 5;
pub const ACTIONS_PER_LEVEL: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    Agriculture,
    Mining,
    Fishing,
    Cooking,
}

impl SkillKind {
    pub const ALL: [SkillKind; 4] = [
        SkillKind::Agriculture,
        SkillKind::Mining,
        SkillKind::Fishing,
        SkillKind::Cooking,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SkillKind::Agriculture => "Agriculture",
            SkillKind::Mining => "Mining",
            SkillKind::Fishing => "Fishing",
            SkillKind::Cooking => "Cooking",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillProgress {
    pub level: u32,
    pub actions: u32,
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    progress: [SkillProgress; 4],
}

impl Skills {
    /// Adds `count` actions. Returns the new level if it changed.
    pub fn record_action(&mut self, kind: SkillKind, count: u32) -> Option<u32> {
        if count == 0 {
            return None;
        }
        let skill = &mut self.progress[kind.index()];
        let before = skill.level;
        skill.actions = skill.actions.saturating_add(count);
        skill.level = (skill.actions / ACTIONS_PER_LEVEL).min(MAX_SKILL_LEVEL);
        if skill.level == before {
            return None;
        }
        info!("[Skills] {} leveled up to {}", kind.name(), skill.level);
        Some(skill.level)
    }

    pub fn set_skill(&mut self, kind: SkillKind, level: u32, actions: u32) {
        self.progress[kind.index()] = SkillProgress {
            level: level.min(MAX_SKILL_LEVEL),
            actions,
        };
    }

    pub fn get(&self, kind: SkillKind) -> SkillProgress {
        self.progress[kind.index()]
    }

    pub fn level(&self, kind: SkillKind) -> u32 {
        self.get(kind).level
    }

    /// Fraction of the way to the next level; 1.0 once maxed.
    pub fn progress_to_next_level(&self, kind: SkillKind) -> f32 {
        let skill = self.get(kind);
        if skill.level >= MAX_SKILL_LEVEL {
            return 1.0;
        }
        (skill.actions % ACTIONS_PER_LEVEL) as f32 / ACTIONS_PER_LEVEL as f32
    }

    pub fn mining_hit_reduction(&self) -> u32 {
        self.level(SkillKind::Mining)
    }

    pub fn fishing_catch_gain_multiplier(&self) -> f32 {
        1.0 + 0.1 * self.level(SkillKind::Fishing) as f32
    }

    pub fn fishing_catch_loss_multiplier(&self) -> f32 {
        (1.0 - 0.05 * self.level(SkillKind::Fishing) as f32).max(0.5)
    }

    pub fn agriculture_bonus_chance(&self) -> f32 {
        0.05 * self.level(SkillKind::Agriculture) as f32
    }

    pub fn cooking_speed_multiplier(&self) -> f32 {
        1.0 + 0.05 * self.level(SkillKind::Cooking) as f32
    }
}

pub struct SkillsPlugin;

impl Plugin for SkillsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Skills>();
    }
}
