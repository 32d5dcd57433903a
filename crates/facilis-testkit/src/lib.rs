// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use facilis_table::{CellValue, Column, ColumnSet, RowId};
use std::path::PathBuf;
use time::Date;
use time::macros::date;

const CATEGORIES: [&str; 8] = [
    "Electrical",
    "Elevator",
    "Fire Safety",
    "HVAC",
    "IT",
    "Plumbing",
    "Security",
    "Vehicles",
];

const SITES: [&str; 6] = [
    "North Campus",
    "South Campus",
    "Riverside Depot",
    "Harbor Office",
    "West Warehouse",
    "Data Center",
];

const ASSET_NAMES: [(&str, &str); 16] = [
    ("Electrical", "Distribution panel"),
    ("Electrical", "Standby generator"),
    ("Elevator", "Passenger lift"),
    ("Elevator", "Freight lift"),
    ("Fire Safety", "Sprinkler riser"),
    ("Fire Safety", "Alarm control panel"),
    ("HVAC", "Rooftop unit"),
    ("HVAC", "Chiller"),
    ("HVAC", "Boiler"),
    ("IT", "Core switch"),
    ("IT", "UPS"),
    ("Plumbing", "Backflow preventer"),
    ("Plumbing", "Water heater"),
    ("Security", "Badge reader"),
    ("Security", "Camera array"),
    ("Vehicles", "Utility van"),
];

const VENDOR_ADJECTIVES: [&str; 10] = [
    "Premier", "Central", "Reliable", "Summit", "Apex", "Keystone", "Harbor", "Northwind",
    "Granite", "Meridian",
];
const VENDOR_SUFFIXES: [&str; 5] = ["Services", "Systems", "Co", "Group", "Works"];

const NOTE_WORDS: [&str; 20] = [
    "inspect",
    "replace",
    "filter",
    "belt",
    "quarterly",
    "annual",
    "service",
    "contract",
    "pending",
    "quote",
    "noisy",
    "bearing",
    "leak",
    "gasket",
    "firmware",
    "upgrade",
    "calibrate",
    "sensor",
    "warranty",
    "claim",
];

const REFERENCE_DATE: Date = date!(2026 - 01 - 01);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AssetStatus {
    Active,
    InRepair,
    Standby,
    Retired,
}

impl AssetStatus {
    pub const ALL: [Self; 4] = [Self::Active, Self::InRepair, Self::Standby, Self::Retired];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InRepair => "in repair",
            Self::Standby => "standby",
            Self::Retired => "retired",
        }
    }
}

/// A tracked piece of equipment, the row type used by the demo table and
/// by tests across the workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: RowId,
    pub tag: String,
    pub name: String,
    pub category: String,
    pub site: String,
    pub status: AssetStatus,
    pub purchase_date: Option<Date>,
    pub cost_cents: Option<i64>,
    pub vendor: String,
    pub under_warranty: bool,
    pub notes: String,
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

#[derive(Debug, Clone)]
pub struct FacilityFaker {
    rng: DeterministicRng,
    next_id: i64,
}

impl FacilityFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn asset(&mut self) -> Asset {
        let id = self.next_id;
        self.next_id += 1;

        let (category, name) = ASSET_NAMES[self.rng.int_n(ASSET_NAMES.len())];
        let status = AssetStatus::ALL[self.rng.int_n(AssetStatus::ALL.len())];
        // Roughly one in six assets predates the register and has no
        // purchase record.
        let purchase_date = (self.int_range_i64(1, 6) > 1).then(|| {
            self.date_between(REFERENCE_DATE - time::Duration::days(3650), REFERENCE_DATE)
        });
        let cost_cents = purchase_date.map(|_| self.int_range_i64(25_000, 12_000_000));
        let under_warranty = purchase_date
            .is_some_and(|date| (REFERENCE_DATE - date).whole_days() < 3 * 365)
            && self.rng.bool();

        Asset {
            id: RowId::new(id),
            tag: format!("{}-{id:04}", category_prefix(category)),
            name: name.to_owned(),
            category: category.to_owned(),
            site: self.pick(&SITES).to_owned(),
            status,
            purchase_date,
            cost_cents,
            vendor: self.vendor_name(category),
            under_warranty,
            notes: self.sentence(0, 5),
        }
    }

    pub fn assets(&mut self, count: usize) -> Vec<Asset> {
        (0..count).map(|_| self.asset()).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn date_between(&mut self, start: Date, end: Date) -> Date {
        let start_day = start.to_julian_day();
        let end_day = end.to_julian_day();
        if end_day <= start_day {
            return start;
        }
        let offset = self.int_range_i64(0, i64::from(end_day - start_day));
        Date::from_julian_day(start_day + offset as i32).unwrap_or(start)
    }

    fn vendor_name(&mut self, category: &str) -> String {
        if self.rng.bool() {
            format!("{} {}", self.pick(&VENDOR_ADJECTIVES), category)
        } else {
            format!(
                "{} {}",
                self.pick(&VENDOR_ADJECTIVES),
                self.pick(&VENDOR_SUFFIXES)
            )
        }
    }

    fn sentence(&mut self, min_words: usize, max_words: usize) -> String {
        let count = self.int_range_i64(min_words as i64, max_words as i64) as usize;
        if count == 0 {
            return String::new();
        }
        let mut parts = Vec::with_capacity(count);
        for _ in 0..count {
            parts.push(self.pick(&NOTE_WORDS).to_owned());
        }
        let mut sentence = parts.join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }
}

/// Deterministic asset register for demos and tests.
pub fn sample_assets(seed: u64, count: usize) -> Vec<Asset> {
    FacilityFaker::new(seed).assets(count)
}

/// Column configuration for the asset register. The tag stays pinned to
/// the left, notes are not sortable, and vendor and warranty start hidden.
pub fn asset_columns() -> Result<ColumnSet<Asset>> {
    ColumnSet::new(vec![
        Column::new("tag", "Tag", |asset: &Asset| CellValue::text(&asset.tag)).draggable(false),
        Column::new("name", "Name", |asset: &Asset| CellValue::text(&asset.name)),
        Column::new("category", "Category", |asset: &Asset| {
            CellValue::text(&asset.category)
        }),
        Column::new("site", "Site", |asset: &Asset| CellValue::text(&asset.site)),
        Column::new("status", "Status", |asset: &Asset| {
            CellValue::text(asset.status.as_str())
        }),
        Column::new("purchased", "Purchased", |asset: &Asset| {
            CellValue::from(asset.purchase_date)
        }),
        Column::new("cost", "Cost", |asset: &Asset| {
            asset.cost_cents.map_or(CellValue::Empty, CellValue::Money)
        }),
        Column::new("vendor", "Vendor", |asset: &Asset| {
            CellValue::text(&asset.vendor)
        })
        .hidden_by_default(),
        Column::new("warranty", "Warranty", |asset: &Asset| {
            CellValue::Bool(asset.under_warranty)
        })
        .hidden_by_default(),
        Column::new("notes", "Notes", |asset: &Asset| CellValue::text(&asset.notes))
            .sortable(false),
    ])
    .context("build asset columns")
}

pub fn asset_id(asset: &Asset) -> RowId {
    asset.id
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("facilis.db");
    Ok((dir, db_path))
}

pub fn categories() -> &'static [&'static str] {
    &CATEGORIES
}

pub fn sites() -> &'static [&'static str] {
    &SITES
}

fn category_prefix(category: &str) -> String {
    category
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .chain(category.chars().skip(1))
        .filter(char::is_ascii_alphabetic)
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::{
        AssetStatus, FacilityFaker, asset_columns, categories, category_prefix, sample_assets,
        sites,
    };
    use std::collections::BTreeSet;

    #[test]
    fn new_deterministic_seed() {
        let left = sample_assets(42, 10);
        let right = sample_assets(42, 10);
        assert_eq!(left, right);
    }

    #[test]
    fn ids_are_sequential_and_tags_unique() {
        let assets = sample_assets(7, 50);
        let ids = assets.iter().map(|asset| asset.id.get()).collect::<Vec<_>>();
        assert_eq!(ids, (1..=50).collect::<Vec<_>>());

        let tags = assets
            .iter()
            .map(|asset| asset.tag.as_str())
            .collect::<BTreeSet<_>>();
        assert_eq!(tags.len(), 50);
    }

    #[test]
    fn asset_fields_are_populated() {
        let mut faker = FacilityFaker::new(3);
        for _ in 0..40 {
            let asset = faker.asset();
            assert!(!asset.name.is_empty());
            assert!(categories().contains(&asset.category.as_str()));
            assert!(sites().contains(&asset.site.as_str()));
            assert_eq!(asset.purchase_date.is_some(), asset.cost_cents.is_some());
            if asset.under_warranty {
                assert!(asset.purchase_date.is_some());
            }
        }
    }

    #[test]
    fn variety_across_seeds() {
        let statuses = (0_u64..20)
            .flat_map(|seed| sample_assets(seed, 5))
            .map(|asset| asset.status)
            .collect::<BTreeSet<_>>();
        assert_eq!(statuses.len(), AssetStatus::ALL.len());
    }

    #[test]
    fn category_prefix_uses_initials() {
        assert_eq!(category_prefix("HVAC"), "HVA");
        assert_eq!(category_prefix("Fire Safety"), "FSI");
        assert_eq!(category_prefix("IT"), "IT");
    }

    #[test]
    fn asset_columns_default_layout() -> anyhow::Result<()> {
        let columns = asset_columns()?;
        assert_eq!(columns.len(), 10);
        let hidden = columns
            .iter()
            .filter(|column| !column.is_default_visible())
            .map(|column| column.key())
            .collect::<Vec<_>>();
        assert_eq!(hidden, vec!["vendor", "warranty"]);
        assert!(!columns.get("tag").is_some_and(|column| column.is_draggable()));
        assert!(!columns.get("notes").is_some_and(|column| column.is_sortable()));
        Ok(())
    }

    #[test]
    fn int_n() {
        let mut faker = FacilityFaker::new(42);
        for _ in 0..100 {
            assert!(faker.int_n(5) < 5);
        }
        assert_eq!(faker.int_n(1), 0);
        assert_eq!(faker.int_n(0), 0);
    }
}
