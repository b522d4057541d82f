//! Static crop catalog.

use std::collections::HashMap;

use crate::shared::*;

/// One crop's growth plan. Each entry of `stage_days` is the number of
/// watered days that stage needs on its own; they do not accumulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropDef {
    pub kind: CropKind,
    pub name: &'static str,
    pub stage_days: Vec<u32>,
    pub sale_price: i32,
}

impl CropDef {
    pub fn stage_count(&self) -> u32 {
        self.stage_days.len() as u32
    }

    pub fn is_mature_at(&self, stage: u32) -> bool {
        stage >= self.stage_count()
    }

    /// Watered days from seed to harvest.
    pub fn total_days(&self) -> u32 {
        self.stage_days.iter().sum()
    }
}

#[derive(Debug, Clone)]
pub struct CropRegistry {
    crops: HashMap<CropKind, CropDef>,
}

impl Default for CropRegistry {
    fn default() -> Self {
        let defs = [
            (CropKind::Turnip, "Turnip", vec![1, 1, 1], 60),
            (CropKind::Potato, "Potato", vec![1, 2, 1], 80),
            (CropKind::Corn, "Corn", vec![2, 2, 2], 120),
            (CropKind::Tomato, "Tomato", vec![1, 2, 2], 90),
            (CropKind::Pumpkin, "Pumpkin", vec![2, 3, 3], 180),
            (CropKind::Blueberry, "Blueberry", vec![1, 2, 3], 110),
        ];
        let crops = defs
            .into_iter()
            .map(|(kind, name, stage_days, sale_price)| {
                (kind, CropDef { kind, name, stage_days, sale_price })
            })
            .collect();
        Self { crops }
    }
}

impl CropRegistry {
    /// Registry holding only the given definitions.
    pub fn with_defs(defs: impl IntoIterator<Item = CropDef>) -> Self {
        Self {
            crops: defs.into_iter().map(|d| (d.kind, d)).collect(),
        }
    }

    pub fn get(&self, kind: CropKind) -> Option<&CropDef> {
        self.crops.get(&kind)
    }

    pub fn contains(&self, kind: CropKind) -> bool {
        self.crops.contains_key(&kind)
    }

    pub fn stage_count(&self, kind: CropKind) -> u32 {
        self.get(kind).map(CropDef::stage_count).unwrap_or(0)
    }
}
