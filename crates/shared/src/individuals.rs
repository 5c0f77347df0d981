use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::models::{Color, IndividualChanges, IndividualRecord, TrackedIndividual};

pub type IndividualListener = Box<dyn FnMut(&[TrackedIndividual])>;

/// Answers "should this tag be drawn right now".
pub trait Visibility {
    fn is_visible(&self, tag_id: &str) -> bool;
}

impl<F> Visibility for F
where
    F: Fn(&str) -> bool,
{
    fn is_visible(&self, tag_id: &str) -> bool {
        self(tag_id)
    }
}

/// Result of [`IndividualRegistry::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub found: bool,
    /// Set when the update carried a color for a known individual.
    pub color: Option<Color>,
}

/// Everyone currently loaded, keyed by tag id, in first-seen order.
pub struct IndividualRegistry {
    individuals: Vec<TrackedIndividual>,
    rng: StdRng,
    listeners: Vec<IndividualListener>,
}

impl IndividualRegistry {
    pub fn new(rng: StdRng) -> Self {
        Self {
            individuals: Vec::new(),
            rng,
            listeners: Vec::new(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&[TrackedIndividual]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Replace the whole registry with the distinct tags in `records`.
    ///
    /// A tag seen several times keeps its first position and its last name.
    /// Every individual gets a fresh random color and starts visible.
    pub fn load<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = IndividualRecord>,
    {
        let mut unique: IndexMap<String, String> = IndexMap::new();
        for record in records {
            unique.insert(record.tag_id, record.name);
        }

        let individuals = unique
            .into_iter()
            .map(|(id, name)| TrackedIndividual {
                id,
                name,
                color: Color::random(&mut self.rng),
                visible: true,
            })
            .collect();
        self.individuals = individuals;

        tracing::info!(count = self.individuals.len(), "individuals loaded");
        self.publish();
    }

    /// Apply `changes` to the individual `id`. Unknown ids are ignored.
    pub fn update(&mut self, id: &str, changes: &IndividualChanges) -> UpdateOutcome {
        let Some(individual) = self.individuals.iter_mut().find(|ind| ind.id == id) else {
            tracing::debug!(tag_id = %id, "update for unknown individual ignored");
            return UpdateOutcome::default();
        };
        if individual.apply(changes) {
            tracing::debug!(tag_id = %id, ?changes, "individual updated");
            self.publish();
        }
        UpdateOutcome {
            found: true,
            color: changes.color,
        }
    }

    pub fn color_of(&self, id: &str) -> Option<Color> {
        self.get(id).map(|ind| ind.color)
    }

    pub fn get(&self, id: &str) -> Option<&TrackedIndividual> {
        self.individuals.iter().find(|ind| ind.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedIndividual> {
        self.individuals.iter()
    }

    pub fn as_slice(&self) -> &[TrackedIndividual] {
        &self.individuals
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    fn publish(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.individuals);
        }
    }
}

impl Visibility for IndividualRegistry {
    fn is_visible(&self, tag_id: &str) -> bool {
        self.get(tag_id).is_some_and(|ind| ind.visible)
    }
}
