use crate::database::models::{Engineer, EngineerTemplate};
use crate::database::store::{abort, EngineerStore, StoreError};

/// Demo profiles loaded at startup when seeding is enabled
pub fn initial_engineers() -> Vec<EngineerTemplate> {
    [
        ("masud", "Masudur", "Rahman", "Madaripur", "Dhaka"),
        ("fahim", "Fahim", "Abrar", "Chittagong", "Chittagong"),
        ("tahsin", "Tahsin", "Rahman", "Chittagong", "Chittagong"),
        ("jenny", "Jannatul", "Ferdows", "Chittagong", "Chittagong"),
    ]
    .into_iter()
    .map(|(username, first, last, city, division)| EngineerTemplate {
        username: Some(username.to_string()),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        city: Some(city.to_string()),
        division: Some(division.to_string()),
        position: Some("Software Engineer".to_string()),
    })
    .collect()
}

/// Insert the given profiles in one transaction, skipping any username that
/// already exists in either scope. Returns how many rows were inserted.
pub async fn seed_engineers(
    store: &dyn EngineerStore,
    profiles: Vec<EngineerTemplate>,
) -> Result<usize, StoreError> {
    let mut session = store.begin().await?;
    let mut inserted = 0;

    for profile in profiles {
        let existing = match store.get_unscoped(profile.username()).await {
            Ok(existing) => existing,
            Err(e) => return Err(abort(session, e).await),
        };
        if existing.is_some() {
            tracing::debug!("Seed profile '{}' already present", profile.username());
            continue;
        }

        let mut engineer = Engineer::from(profile);
        if let Err(e) = session.insert(&mut engineer).await {
            return Err(abort(session, e).await);
        }
        inserted += 1;
    }

    session.commit().await?;
    tracing::info!("Seeded {} engineer profiles", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryEngineerStore;
    use crate::database::models::EngineerFilter;

    #[tokio::test]
    async fn seeding_twice_is_a_no_op() {
        let store = MemoryEngineerStore::new();

        assert_eq!(seed_engineers(&store, initial_engineers()).await.unwrap(), 4);
        assert_eq!(seed_engineers(&store, initial_engineers()).await.unwrap(), 0);

        let all = store.find(&EngineerFilter::default()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|engineer| engineer.version == 1));
    }
}
