// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use tracing::{debug, instrument};

use crate::{
    catalog::Catalog,
    error::Error,
    models::{CartEntry, ItemId, Round},
};

/// Generates a fresh round: a random cart with some entries flagged
/// unavailable, each of those with a non-empty replacement candidate set.
///
/// Candidate pools are recomputed per flagged item so that an entry is only
/// ever marked unavailable when excluding itself still leaves alternatives.
#[instrument(skip(catalog), err)]
pub(crate) fn generate_round(
    catalog: &Catalog,
    cart_size: usize,
    unavailable_count: usize,
    max_candidates: usize,
) -> Result<Round, Error> {
    if catalog.len() < cart_size {
        return Err(Error::InsufficientCatalog {
            requested: cart_size,
            available: catalog.len(),
        });
    }

    let mut rng = rand::thread_rng();
    let cart = catalog
        .items()
        .choose_multiple(&mut rng, cart_size)
        .cloned()
        .collect::<Vec<_>>();

    // first pass: categories with at least one other item
    let eligible = cart
        .iter()
        .filter(|item| catalog.in_category(&item.category).len() > 1)
        .cloned()
        .collect::<Vec<_>>();

    let mut replacements = HashMap::new();
    let mut unavailable = HashSet::<ItemId>::new();
    for item in eligible.choose_multiple(&mut rng, unavailable_count) {
        // second pass: confirm the pool stays non-empty once the item itself
        // is excluded, else leave the entry available
        let pool = catalog.alternatives(item);
        if pool.is_empty() {
            debug!(id = %item.id, "no replacements after exclusion, keeping entry available");
            continue;
        }
        let candidates = pool
            .choose_multiple(&mut rng, max_candidates)
            .map(|candidate| (**candidate).clone())
            .collect::<Vec<_>>();
        unavailable.insert(item.id.clone());
        replacements.insert(item.id.clone(), candidates);
    }

    let cart = cart
        .into_iter()
        .map(|item| CartEntry {
            id: item.id.clone(),
            title: item.title.clone(),
            category: item.category.clone(),
            price: item.price,
            rating: item.rating,
            unavailable: unavailable.contains(&item.id),
        })
        .collect();

    Ok(Round { cart, replacements })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::item;

    fn catalog() -> Catalog {
        Catalog::from_items([
            item("a1", "dairy", Some(2.), 4.),
            item("a2", "dairy", Some(3.), 4.5),
            item("a3", "dairy", Some(2.5), 3.5),
            item("b1", "bakery", Some(1.), 3.),
            item("b2", "bakery", Some(1.5), 4.),
            item("c1", "frozen", Some(5.), 2.),
        ])
    }

    #[test]
    fn test_round_has_requested_cart_size() {
        let catalog = catalog();
        for _ in 0..50 {
            let round = generate_round(&catalog, 4, 2, 4).unwrap();
            assert_eq!(round.cart.len(), 4);
            assert!(round.cart.iter().filter(|entry| entry.unavailable).count() <= 2);
        }
    }

    #[test]
    fn test_unavailable_entries_always_have_replacements() {
        let catalog = catalog();
        for _ in 0..50 {
            let round = generate_round(&catalog, 4, 2, 4).unwrap();
            for entry in round.cart.iter().filter(|entry| entry.unavailable) {
                let candidates = round.replacements.get(&entry.id).unwrap();
                assert!(!candidates.is_empty());
                assert!(candidates.iter().all(|candidate| candidate.id != entry.id));
                assert!(candidates.len() <= 4);
            }
        }
    }

    #[test]
    fn test_single_item_categories_stay_available() {
        let catalog = Catalog::from_items([
            item("c1", "frozen", Some(5.), 2.),
            item("d1", "spices", Some(1.), 5.),
        ]);
        for _ in 0..20 {
            let round = generate_round(&catalog, 2, 2, 4).unwrap();
            assert!(round.cart.iter().all(|entry| !entry.unavailable));
            assert!(round.replacements.is_empty());
        }
    }

    #[test]
    fn test_oversized_cart_is_rejected() {
        assert!(matches!(
            generate_round(&catalog(), 7, 2, 4),
            Err(Error::InsufficientCatalog {
                requested: 7,
                available: 6,
            }),
        ));
    }
}
