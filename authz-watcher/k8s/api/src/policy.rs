pub mod authorization_policy;

pub use self::authorization_policy::{
    Action, AuthorizationPolicy, AuthorizationPolicySpec, Condition, ExtensionProvider, Operation,
    PolicyTargetReference, Rule, RuleFrom, RuleTo, Source, WorkloadSelector,
};

/// The API group of Istio's security resources.
pub const SECURITY_API_GROUP: &str = "security.istio.io";
