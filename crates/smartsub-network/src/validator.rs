use smartsub_core::Tag;
use std::future::Future;

/// Anything that can judge a tag.
///
/// Validation never fails from the caller's point of view: transport errors,
/// timeouts and unexpected responses all come back as `false`.
///
/// The returned future is `Send` so a validation can run inside a spawned
/// task. Implementors may simply write `async fn validate`.
///
/// # Example
///
/// ```
/// use smartsub_core::Tag;
/// use smartsub_network::TagValidator;
///
/// struct Allowlist(Vec<String>);
///
/// impl TagValidator for Allowlist {
///     async fn validate(&self, tag: &Tag) -> bool {
///         self.0.iter().any(|t| t == tag.as_str())
///     }
/// }
/// ```
pub trait TagValidator: Send + Sync + 'static {
    /// Return `true` if the tag is accepted.
    fn validate(&self, tag: &Tag) -> impl Future<Output = bool> + Send;
}
