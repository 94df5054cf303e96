//! Enrichment: raw directory records to display records.
//!
//! Every derived field comes from a generator seeded explicitly from the
//! enricher seed and the person id, so a fixed seed gives fixed output.
//! The map preserves length and order and never looks at neighbouring
//! records.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::model::{DisplayEmployee, EmploymentStatus, RawPerson};

/// Role title assigned to every employee in this dataset.
pub const POSITION: &str = "Software Engineer";

/// Avatar service URL; the person id selects the image.
const AVATAR_URL: &str = "https://i.pravatar.cc/150?img=";

const SEED_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

/// How derived values behave across refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentMode {
    /// New values on every fetch.
    #[default]
    Fresh,
    /// Values depend only on (seed, person id) and survive refreshes.
    StablePerPerson,
}

/// Seeded enrichment step.
#[derive(Debug, Clone)]
pub struct Enricher {
    mode: EnrichmentMode,
    seed: u64,
}

impl Enricher {
    pub fn new(mode: EnrichmentMode, seed: u64) -> Self {
        Self { mode, seed }
    }

    /// Enricher with a seed drawn from the OS generator.
    pub fn from_entropy(mode: EnrichmentMode) -> Self {
        Self::new(mode, rand::random())
    }

    /// Uses `seed` when given, otherwise entropy.
    pub fn with_optional_seed(mode: EnrichmentMode, seed: Option<u64>) -> Self {
        seed.map_or_else(|| Self::from_entropy(mode), |seed| Self::new(mode, seed))
    }

    /// Seed the next batch will use.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Enriches one fetched batch.
    pub fn enrich(&mut self, people: &[RawPerson]) -> Vec<DisplayEmployee> {
        let batch_seed = match self.mode {
            EnrichmentMode::Fresh => {
                let current = self.seed;
                self.seed = self.seed.wrapping_add(SEED_STEP);
                current
            }
            EnrichmentMode::StablePerPerson => self.seed,
        };

        people
            .iter()
            .map(|person| enrich_person(person, &mut record_rng(batch_seed, person.id)))
            .collect()
    }
}

fn record_rng(batch_seed: u64, id: u64) -> StdRng {
    StdRng::seed_from_u64(batch_seed ^ id.wrapping_mul(SEED_STEP))
}

/// Derives the display fields for a single person.
pub fn enrich_person<R: Rng + ?Sized>(person: &RawPerson, rng: &mut R) -> DisplayEmployee {
    let experience = rng.gen_range(1..=10u8);
    let rating_tenths = rng.gen_range(40..50u8);
    let salary = rng.gen_range(3_000_000..6_000_000u32);
    let status = if rng.gen_bool(0.5) {
        EmploymentStatus::Permanent
    } else {
        EmploymentStatus::Contract
    };

    DisplayEmployee {
        id: person.id,
        name: person.name.clone(),
        address: person.address.clone(),
        position: POSITION.to_string(),
        experience,
        rating: format!("{}.{}", rating_tenths / 10, rating_tenths % 10),
        salary,
        avatar: format!("{AVATAR_URL}{}", person.id),
        status,
    }
}
