use crate::error::ReconcileError;

pub const CONFIG_ROOT: &str = "/config";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigAttribute {
    Ipv6CidrBlock,
    DomainName,
}

impl ConfigAttribute {
    pub const ALL: [ConfigAttribute; 2] = [Self::Ipv6CidrBlock, Self::DomainName];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ipv6CidrBlock => "ipv6CidrBlock",
            Self::DomainName => "domainName",
        }
    }
}

pub fn config_path(stack_name: &str, attribute: ConfigAttribute) -> String {
    format!("{CONFIG_ROOT}/{stack_name}/{}", attribute.as_str())
}

/// Every configuration path a stack can own, in a stable order.
pub fn stack_config_paths(stack_name: &str) -> Vec<String> {
    ConfigAttribute::ALL
        .iter()
        .map(|attribute| config_path(stack_name, *attribute))
        .collect()
}

/// A stack name is a single path segment. Anything else could let two
/// stacks write to the same entry.
pub fn validate_stack_name(stack_name: &str) -> Result<(), ReconcileError> {
    if stack_name.is_empty() {
        return Err(ReconcileError::InvalidEvent(
            "stack name cannot be empty".to_string(),
        ));
    }
    if stack_name.contains('/') {
        return Err(ReconcileError::InvalidEvent(format!(
            "stack name must not contain '/': {stack_name}"
        )));
    }
    Ok(())
}
