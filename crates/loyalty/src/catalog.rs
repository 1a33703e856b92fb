//! The item catalog: an ordered collection of priced items, each of which can
//! be switched in or out of tiering and calculation.

use rewards_core::{Item, RewardsError, RewardsResult};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    /// Build a catalog from `(name, price)` pairs. Entries with a negative or
    /// non-finite price are dropped.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut dropped = 0u64;
        let items = entries
            .into_iter()
            .filter_map(|(name, price)| {
                if price.is_finite() && price >= 0.0 {
                    Some(Item::new(name, price))
                } else {
                    dropped += 1;
                    None
                }
            })
            .collect::<Vec<_>>();

        if dropped > 0 {
            metrics::counter!("rewards.catalog_rows_dropped").increment(dropped);
            debug!(dropped, kept = items.len(), "Dropped catalog entries with invalid prices");
        }

        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Included items in catalog order.
    pub fn included(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| i.included)
    }

    pub fn included_count(&self) -> usize {
        self.included().count()
    }

    pub fn get(&self, id: &Uuid) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name == name)
    }

    /// Flip an item's inclusion and return the new state.
    pub fn toggle(&mut self, id: &Uuid) -> RewardsResult<bool> {
        let item = self.get_mut(id)?;
        item.included = !item.included;
        Ok(item.included)
    }

    pub fn set_included(&mut self, id: &Uuid, included: bool) -> RewardsResult<()> {
        self.get_mut(id)?.included = included;
        Ok(())
    }

    pub fn include_all(&mut self) {
        self.items.iter_mut().for_each(|i| i.included = true);
    }

    pub fn exclude_all(&mut self) {
        self.items.iter_mut().for_each(|i| i.included = false);
    }

    /// Combined retail value of the included items.
    pub fn total_value(&self) -> f64 {
        self.included().map(|i| i.retail_price).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn get_mut(&mut self, id: &Uuid) -> RewardsResult<&mut Item> {
        self.items
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or(RewardsError::ItemNotFound(*id))
    }
}
