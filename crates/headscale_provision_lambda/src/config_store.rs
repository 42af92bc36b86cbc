//! Writes discovered values under stack-scoped configuration paths.

use headscale_provision_core::config_paths::{config_path, ConfigAttribute};
use headscale_provision_core::error::ReconcileError;
use tracing::info;

use crate::adapters::parameter_store::{DeleteOutcome, ParameterStore};

pub fn write(store: &dyn ParameterStore, path: &str, value: &str) -> Result<(), ReconcileError> {
    store.put_parameter(path, value)?;
    info!(component = "config_store", event = "config_written", path, value);
    Ok(())
}

/// Removes `path`. An entry that is already gone counts as deleted.
pub fn delete(store: &dyn ParameterStore, path: &str) -> Result<(), ReconcileError> {
    match store.delete_parameter(path)? {
        DeleteOutcome::Deleted => {
            info!(component = "config_store", event = "config_deleted", path);
        }
        DeleteOutcome::AlreadyAbsent => {
            info!(
                component = "config_store",
                event = "config_already_absent",
                path,
                "entry was already absent"
            );
        }
    }
    Ok(())
}

pub fn write_attribute(
    store: &dyn ParameterStore,
    stack_name: &str,
    attribute: ConfigAttribute,
    value: &str,
) -> Result<String, ReconcileError> {
    let path = config_path(stack_name, attribute);
    write(store, &path, value)?;
    Ok(path)
}

/// Deletes every listed entry, attempting all of them before reporting the
/// first failure.
pub fn delete_attributes(
    store: &dyn ParameterStore,
    stack_name: &str,
    attributes: &[ConfigAttribute],
) -> Result<(), ReconcileError> {
    let mut first_error = None;
    for attribute in attributes {
        if let Err(error) = delete(store, &config_path(stack_name, *attribute)) {
            first_error.get_or_insert(error);
        }
    }
    first_error.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use crate::test_helpers::RecordingStore;

    use super::*;

    #[test]
    fn repeated_writes_leave_one_entry() {
        let store = RecordingStore::new();
        for _ in 0..2 {
            write_attribute(
                &store,
                "headscale",
                ConfigAttribute::Ipv6CidrBlock,
                "2600:1f18:abcd::/56",
            )
            .expect("write should succeed");
        }

        let values = store.values();
        assert_eq!(values.len(), 1);
        assert_eq!(
            values.get("/config/headscale/ipv6CidrBlock").map(String::as_str),
            Some("2600:1f18:abcd::/56")
        );
    }

    #[test]
    fn write_overwrites_previous_value() {
        let store = RecordingStore::new();
        store.seed("/config/headscale/domainName", "old.example.com");
        write(&store, "/config/headscale/domainName", "new.example.com")
            .expect("write should succeed");
        assert_eq!(
            store.values().get("/config/headscale/domainName").map(String::as_str),
            Some("new.example.com")
        );
    }

    #[test]
    fn deleting_twice_is_tolerated() {
        let store = RecordingStore::new();
        store.seed("/config/headscale/ipv6CidrBlock", "2600::/56");

        delete(&store, "/config/headscale/ipv6CidrBlock").expect("first delete succeeds");
        delete(&store, "/config/headscale/ipv6CidrBlock").expect("second delete succeeds");
        assert!(store.values().is_empty());
    }

    #[test]
    fn deletes_only_the_named_stack() {
        let store = RecordingStore::new();
        store.seed("/config/headscale/ipv6CidrBlock", "2600:1::/56");
        store.seed("/config/headscale/domainName", "a.example.com");
        store.seed("/config/other/ipv6CidrBlock", "2600:2::/56");

        delete_attributes(&store, "headscale", &ConfigAttribute::ALL)
            .expect("delete should succeed");

        let values = store.values();
        assert_eq!(values.len(), 1);
        assert!(values.contains_key("/config/other/ipv6CidrBlock"));
    }
}
