use super::{MethodExecutionContext, ProxyListener};
use crate::core::Result;
use crate::proxy::ProxyConfig;
use std::future::Future;
use std::time::Instant;

/// Runs `callback` between the `before_method` and `after_method`
/// notifications of the config's listeners.
///
/// The callback result is returned unchanged. When the callback fails,
/// listeners see the error text in the context before the error is
/// handed back to the caller.
pub async fn invoke<T, F, Fut>(
    config: &ProxyConfig,
    mut context: MethodExecutionContext,
    callback: F,
) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let listener = config.listener();

    listener.before_method(&context);

    let start = Instant::now();
    let result = callback().await;
    context.elapsed = Some(start.elapsed());

    if let Err(err) = &result {
        context.error = Some(err.to_string());
    }

    listener.after_method(&context);

    result
}
