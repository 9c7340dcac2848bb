/// How far a provider failure reaches.
///
/// Used by the gateway to decide whether a failure affects only the current
/// request or the provider as a whole.
///
/// | Scope | Suppress provider? | Stale fallback? |
/// |-------|--------------------|-----------------|
/// | `Client` | No | No |
/// | `ProviderWindow` | Yes, until the window rolls | Yes |
/// | `Request` | No | No |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureScope {
    /// The request is invalid or asks for something that does not exist.
    /// Retrying the same request won't help.
    Client,

    /// The provider is out of quota.
    ///
    /// Further calls to the same provider are suppressed for the remainder
    /// of its rate window, and a stale cached payload may be served instead.
    ProviderWindow,

    /// Only this request failed (HTTP error, timeout, malformed payload).
    Request,
}
