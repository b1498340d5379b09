use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Road classification. Class decides cost, and whether adjacent buildings
/// may take direct access (highways conduct traffic but forbid driveways).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoadClass {
    Local,
    Avenue,
    Highway,
    Footpath,
}

impl RoadClass {
    pub fn allows_direct_access(self) -> bool {
        !matches!(self, RoadClass::Highway)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UtilityClass {
    Power,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingCategory {
    Road,
    Utility,
    Residential,
    Commercial,
    Industrial,
    Civic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    LocalRoad,
    Avenue,
    Highway,
    Footpath,
    PowerLine,
    WaterPipe,
    House,
    Apartment,
    Shop,
    Mall,
    Factory,
    Warehouse,
    FireStation,
    Hospital,
    School,
    Park,
    CoalPlant,
    WindFarm,
    WaterTower,
    SewagePlant,
}

/// Static definition of a building type: footprint, cost, per-tick utility
/// quantities, and the classification flags the placement rules consult.
#[derive(Debug, Clone)]
pub struct BuildingDef {
    pub kind: BuildingKind,
    pub name: &'static str,
    /// Footprint in cells, (width, height), each >= 1.
    pub size: (usize, usize),
    pub cost: i64,
    pub maintenance: i64,
    pub power_output: i32,
    pub power_demand: i32,
    pub water_output: i32,
    pub water_demand: i32,
    pub road_class: Option<RoadClass>,
    pub utility: Option<UtilityClass>,
    pub requires_road_access: bool,
    pub category: BuildingCategory,
}

impl BuildingDef {
    pub fn is_road(&self) -> bool {
        self.road_class.is_some()
    }

    pub fn is_utility_line(&self) -> bool {
        self.utility.is_some()
    }

    pub fn is_infrastructure(&self) -> bool {
        self.is_road() || self.is_utility_line()
    }

    /// Whether placing or removing this building changes the power network
    /// state around it (it is a power line, or it produces/consumes power).
    pub fn touches_power(&self) -> bool {
        matches!(self.utility, Some(UtilityClass::Power))
            || self.power_output > 0
            || self.power_demand > 0
    }

    /// Same as [`BuildingDef::touches_power`], for the water network.
    pub fn touches_water(&self) -> bool {
        matches!(self.utility, Some(UtilityClass::Water))
            || self.water_output > 0
            || self.water_demand > 0
    }
}

/// Read-only lookup from building kind to its static definition. Loaded once
/// at startup; the placement pipeline treats a missing entry as an unknown
/// building type.
#[derive(Resource, Debug, Clone)]
pub struct BuildingCatalog {
    defs: HashMap<BuildingKind, BuildingDef>,
}

impl Default for BuildingCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Shorthand for the definition tables below.
struct Row {
    kind: BuildingKind,
    name: &'static str,
    size: (usize, usize),
    cost: i64,
    maintenance: i64,
    power: (i32, i32),
    water: (i32, i32),
    road_class: Option<RoadClass>,
    utility: Option<UtilityClass>,
    road_access: bool,
    category: BuildingCategory,
}

impl BuildingCatalog {
    pub fn empty() -> Self {
        Self {
            defs: HashMap::new(),
        }
    }

    /// The built-in definition set.
    pub fn standard() -> Self {
        use BuildingCategory as C;
        use BuildingKind as K;

        let rows = [
            Row {
                kind: K::LocalRoad,
                name: "Local Road",
                size: (1, 1),
                cost: 10,
                maintenance: 1,
                power: (0, 0),
                water: (0, 0),
                road_class: Some(RoadClass::Local),
                utility: None,
                road_access: false,
                category: C::Road,
            },
            Row {
                kind: K::Avenue,
                name: "Avenue",
                size: (1, 1),
                cost: 20,
                maintenance: 2,
                power: (0, 0),
                water: (0, 0),
                road_class: Some(RoadClass::Avenue),
                utility: None,
                road_access: false,
                category: C::Road,
            },
            Row {
                kind: K::Highway,
                name: "Highway",
                size: (1, 1),
                cost: 40,
                maintenance: 4,
                power: (0, 0),
                water: (0, 0),
                road_class: Some(RoadClass::Highway),
                utility: None,
                road_access: false,
                category: C::Road,
            },
            Row {
                kind: K::Footpath,
                name: "Footpath",
                size: (1, 1),
                cost: 5,
                maintenance: 1,
                power: (0, 0),
                water: (0, 0),
                road_class: Some(RoadClass::Footpath),
                utility: None,
                road_access: false,
                category: C::Road,
            },
            Row {
                kind: K::PowerLine,
                name: "Power Line",
                size: (1, 1),
                cost: 5,
                maintenance: 1,
                power: (0, 0),
                water: (0, 0),
                road_class: None,
                utility: Some(UtilityClass::Power),
                road_access: false,
                category: C::Utility,
            },
            Row {
                kind: K::WaterPipe,
                name: "Water Pipe",
                size: (1, 1),
                cost: 5,
                maintenance: 1,
                power: (0, 0),
                water: (0, 0),
                road_class: None,
                utility: Some(UtilityClass::Water),
                road_access: false,
                category: C::Utility,
            },
            Row {
                kind: K::House,
                name: "House",
                size: (1, 1),
                cost: 100,
                maintenance: 0,
                power: (0, 2),
                water: (0, 1),
                road_class: None,
                utility: None,
                road_access: true,
                category: C::Residential,
            },
            Row {
                kind: K::Apartment,
                name: "Apartment Block",
                size: (2, 2),
                cost: 400,
                maintenance: 0,
                power: (0, 10),
                water: (0, 6),
                road_class: None,
                utility: None,
                road_access: true,
                category: C::Residential,
            },
            Row {
                kind: K::Shop,
                name: "Shop",
                size: (1, 1),
                cost: 150,
                maintenance: 0,
                power: (0, 3),
                water: (0, 1),
                road_class: None,
                utility: None,
                road_access: true,
                category: C::Commercial,
            },
            Row {
                kind: K::Mall,
                name: "Shopping Mall",
                size: (2, 2),
                cost: 600,
                maintenance: 5,
                power: (0, 15),
                water: (0, 4),
                road_class: None,
                utility: None,
                road_access: true,
                category: C::Commercial,
            },
            Row {
                kind: K::Factory,
                name: "Factory",
                size: (2, 2),
                cost: 300,
                maintenance: 2,
                power: (0, 12),
                water: (0, 8),
                road_class: None,
                utility: None,
                road_access: true,
                category: C::Industrial,
            },
            Row {
                kind: K::Warehouse,
                name: "Warehouse",
                size: (2, 2),
                cost: 250,
                maintenance: 2,
                power: (0, 4),
                water: (0, 1),
                road_class: None,
                utility: None,
                road_access: true,
                category: C::Industrial,
            },
            Row {
                kind: K::FireStation,
                name: "Fire Station",
                size: (2, 2),
                cost: 500,
                maintenance: 20,
                power: (0, 5),
                water: (0, 8),
                road_class: None,
                utility: None,
                road_access: true,
                category: C::Civic,
            },
            Row {
                kind: K::Hospital,
                name: "Hospital",
                size: (3, 3),
                cost: 1000,
                maintenance: 50,
                power: (0, 20),
                water: (0, 15),
                road_class: None,
                utility: None,
                road_access: true,
                category: C::Civic,
            },
            Row {
                kind: K::School,
                name: "School",
                size: (2, 2),
                cost: 750,
                maintenance: 15,
                power: (0, 8),
                water: (0, 4),
                road_class: None,
                utility: None,
                road_access: true,
                category: C::Civic,
            },
            Row {
                kind: K::Park,
                name: "Park",
                size: (1, 1),
                cost: 100,
                maintenance: 5,
                power: (0, 0),
                water: (0, 1),
                road_class: None,
                utility: None,
                road_access: false,
                category: C::Civic,
            },
            Row {
                kind: K::CoalPlant,
                name: "Coal Power Plant",
                size: (3, 3),
                cost: 2000,
                maintenance: 40,
                power: (100, 0),
                water: (0, 10),
                road_class: None,
                utility: None,
                road_access: true,
                category: C::Utility,
            },
            Row {
                kind: K::WindFarm,
                name: "Wind Farm",
                size: (2, 2),
                cost: 500,
                maintenance: 10,
                power: (20, 0),
                water: (0, 0),
                road_class: None,
                utility: None,
                road_access: false,
                category: C::Utility,
            },
            Row {
                kind: K::WaterTower,
                name: "Water Tower",
                size: (1, 1),
                cost: 200,
                maintenance: 8,
                power: (0, 2),
                water: (50, 0),
                road_class: None,
                utility: None,
                road_access: true,
                category: C::Utility,
            },
            Row {
                kind: K::SewagePlant,
                name: "Sewage Treatment Plant",
                size: (2, 2),
                cost: 800,
                maintenance: 25,
                power: (0, 10),
                water: (100, 0),
                road_class: None,
                utility: None,
                road_access: true,
                category: C::Utility,
            },
        ];

        let mut catalog = Self::empty();
        for row in rows {
            catalog.insert(BuildingDef {
                kind: row.kind,
                name: row.name,
                size: row.size,
                cost: row.cost,
                maintenance: row.maintenance,
                power_output: row.power.0,
                power_demand: row.power.1,
                water_output: row.water.0,
                water_demand: row.water.1,
                road_class: row.road_class,
                utility: row.utility,
                requires_road_access: row.road_access,
                category: row.category,
            });
        }
        catalog
    }

    pub fn insert(&mut self, def: BuildingDef) {
        self.defs.insert(def.kind, def);
    }

    pub fn get(&self, kind: BuildingKind) -> Option<&BuildingDef> {
        self.defs.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildingDef> {
        self.defs.values()
    }
}
