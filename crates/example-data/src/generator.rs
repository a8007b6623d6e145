//! Deterministic household generation from seed definitions.
//!
//! The same seed value always produces identical output: users, the shared
//! household group, one group-linked list, a private list per user, and a
//! spread of items.

use fake::Fake;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::error::GenerationError;
use crate::registry::{SeedDefinition, SeedRegistry};
use crate::seed::{
    ExampleGroupSeed, ExampleHousehold, ExampleItemSeed, ExampleListSeed, ExampleUserSeed,
};

/// A household needs an owner and at least one other member.
const MIN_USERS: usize = 2;

/// Fewest items generated per list.
const MIN_ITEMS_PER_LIST: usize = 2;

/// Most items generated per list.
const MAX_ITEMS_PER_LIST: usize = 4;

/// Generate a complete household from a seed definition.
///
/// Uses the seed's value to initialise a deterministic RNG, ensuring
/// identical output for the same seed definition. The generated data obeys
/// the backend's membership invariants by construction: the group owner is
/// a group member, every list creator is a list member, and every item
/// belongs to a generated list.
///
/// # Errors
///
/// Returns [`GenerationError::TooFewUsers`] when the seed requests fewer
/// than two users — a household needs an owner and a housemate.
///
/// # Example
///
/// ```
/// use example_data::{SeedRegistry, generate_example_household};
///
/// let registry = SeedRegistry::builtin().expect("valid");
/// let seed_def = registry.find_seed("mossy-owl").expect("found");
/// let household = generate_example_household(&registry, seed_def).expect("generated");
///
/// assert_eq!(household.users.len(), 4);
/// let again = generate_example_household(&registry, seed_def).expect("generated");
/// assert_eq!(household, again);
/// ```
pub fn generate_example_household(
    registry: &SeedRegistry,
    seed_def: &SeedDefinition,
) -> Result<ExampleHousehold, GenerationError> {
    let too_few = || GenerationError::TooFewUsers {
        name: seed_def.name().to_owned(),
        count: seed_def.user_count(),
        min: MIN_USERS,
    };
    if seed_def.user_count() < MIN_USERS {
        return Err(too_few());
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed_def.seed());

    let users: Vec<ExampleUserSeed> = (0..seed_def.user_count())
        .map(|index| generate_user(&mut rng, index))
        .collect();
    let Some(owner) = users.first() else {
        return Err(too_few());
    };

    let member_uids: Vec<Uuid> = users.iter().map(|user| user.id).collect();
    let group = ExampleGroupSeed {
        id: Uuid::from_u128(rng.random()),
        group_name: "Household".to_owned(),
        owner_id: owner.id,
        member_uids: member_uids.clone(),
    };

    let mut lists = Vec::with_capacity(users.len() + 1);
    lists.push(ExampleListSeed {
        id: Uuid::from_u128(rng.random()),
        list_name: "Groceries".to_owned(),
        icon: pick(&mut rng, registry.icons()),
        color: pick(&mut rng, registry.colors()),
        creator_id: owner.id,
        members: member_uids,
        linked_to_group: true,
    });
    for user in &users {
        lists.push(ExampleListSeed {
            id: Uuid::from_u128(rng.random()),
            list_name: format!("{}'s list", user.display_name),
            icon: pick(&mut rng, registry.icons()),
            color: pick(&mut rng, registry.colors()),
            creator_id: user.id,
            members: vec![user.id],
            linked_to_group: false,
        });
    }

    let mut items = Vec::new();
    for list in &lists {
        let item_count = rng.random_range(MIN_ITEMS_PER_LIST..=MAX_ITEMS_PER_LIST);
        for _ in 0..item_count {
            items.push(generate_item(&mut rng, registry, list));
        }
    }

    Ok(ExampleHousehold {
        users,
        group,
        lists,
        items,
    })
}

fn generate_user(rng: &mut ChaCha8Rng, index: usize) -> ExampleUserSeed {
    let first: String = FirstName(EN).fake_with_rng(rng);
    let last: String = LastName(EN).fake_with_rng(rng);
    let display_name = format!("{first} {last}");
    ExampleUserSeed {
        id: Uuid::from_u128(rng.random()),
        email: derive_email(&display_name, index),
        display_name,
    }
}

/// Derive a unique lowercase e-mail from a display name.
///
/// Non-alphanumeric characters are dropped, spaces become dots, and the
/// user's index keeps same-name collisions apart.
fn derive_email(display_name: &str, index: usize) -> String {
    let local: String = display_name
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c)
            } else if c == ' ' {
                Some('.')
            } else {
                None
            }
        })
        .collect();
    format!("{local}.{index}@example.com")
}

fn generate_item(
    rng: &mut ChaCha8Rng,
    registry: &SeedRegistry,
    list: &ExampleListSeed,
) -> ExampleItemSeed {
    let quantity = match rng.random_range(0..3_u8) {
        0 => String::new(),
        _ => rng.random_range(1..=6_u32).to_string(),
    };
    let unit = if quantity.is_empty() {
        String::new()
    } else {
        pick(rng, registry.units())
    };
    ExampleItemSeed {
        id: Uuid::from_u128(rng.random()),
        list_id: list.id,
        item_name: pick(rng, registry.item_names()),
        quantity,
        unit,
        // Roughly a third of the items are already checked off.
        is_purchased: rng.random_range(0..3_u8) == 0,
        added_by: pick(rng, &list.members),
    }
}

/// Choose one entry from a catalogue slice.
///
/// Registry validation rejects empty catalogues and list member sets are
/// non-empty by construction, so the default fallback never fires in
/// practice; it just keeps this path panic-free.
fn pick<T: Clone + Default>(rng: &mut ChaCha8Rng, catalogue: &[T]) -> T {
    catalogue.choose(rng).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;

    fn household() -> ExampleHousehold {
        let registry = SeedRegistry::builtin().expect("builtin registry parses");
        let seed_def = registry.find_seed("mossy-owl").expect("seed exists");
        generate_example_household(&registry, seed_def).expect("generation succeeds")
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(household(), household());
    }

    #[test]
    fn the_owner_belongs_to_the_group() {
        let data = household();
        assert!(data.group.member_uids.contains(&data.group.owner_id));
        assert_eq!(data.group.member_uids.len(), data.users.len());
    }

    #[test]
    fn every_creator_is_a_member_of_their_list() {
        let data = household();
        for list in &data.lists {
            assert!(
                list.members.contains(&list.creator_id),
                "creator missing from '{}'",
                list.list_name
            );
        }
    }

    #[test]
    fn every_item_belongs_to_a_generated_list_and_member() {
        let data = household();
        let list_ids: HashSet<Uuid> = data.lists.iter().map(|list| list.id).collect();
        for item in &data.items {
            assert!(list_ids.contains(&item.list_id));
            let owning = data
                .lists
                .iter()
                .find(|list| list.id == item.list_id)
                .expect("list exists");
            assert!(owning.members.contains(&item.added_by));
        }
    }

    #[test]
    fn emails_are_unique_and_lowercase() {
        let data = household();
        let emails: HashSet<&str> = data.users.iter().map(|user| user.email.as_str()).collect();
        assert_eq!(emails.len(), data.users.len());
        for email in emails {
            assert_eq!(email, email.to_lowercase());
            assert!(email.ends_with("@example.com"));
        }
    }

    #[rstest]
    #[case("Ada Lovelace", 0, "ada.lovelace.0@example.com")]
    #[case("Conor O'Brien", 3, "conor.obrien.3@example.com")]
    fn email_derivation_sanitises_names(
        #[case] name: &str,
        #[case] index: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(derive_email(name, index), expected);
    }

    #[test]
    fn undersized_seeds_are_rejected() {
        let json = r#"{"version": 1, "icons": ["a"], "colors": ["b"], "itemNames": ["c"], "units": [""], "seeds": [{"name": "solo", "seed": 1, "userCount": 1}]}"#;
        let registry = SeedRegistry::from_json(json).expect("registry parses");
        let seed_def = registry.find_seed("solo").expect("seed exists");
        assert!(matches!(
            generate_example_household(&registry, seed_def),
            Err(GenerationError::TooFewUsers { count: 1, .. })
        ));
    }
}
