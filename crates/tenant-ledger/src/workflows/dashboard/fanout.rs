use std::future::Future;

use serde::Serialize;

use super::domain::TenantId;
use crate::telemetry::{DiagnosticEvent, DiagnosticSink};
use crate::workflows::providers::ProviderError;

/// Independently fetched portion of a tenant's composite view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slice {
    Billing,
    Room,
    Maintenance,
    Payments,
}

impl Slice {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Billing => "billing",
            Self::Room => "room",
            Self::Maintenance => "maintenance",
            Self::Payments => "payments",
        }
    }
}

/// Outcome of an isolated lookup: the value (or its default) and whether the lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settled<T> {
    pub value: T,
    pub failed: bool,
}

impl<T> Settled<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            failed: false,
        }
    }

    pub fn into_parts(self) -> (T, bool) {
        (self.value, self.failed)
    }
}

/// Failure isolation for lookups keyed off one tenant.
///
/// A failed lookup is recorded as `SliceFailed` and replaced by `T::default()`;
/// the error never reaches the caller.
pub struct Isolation<'a> {
    tenant_id: &'a TenantId,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> Isolation<'a> {
    pub fn new(tenant_id: &'a TenantId, sink: &'a dyn DiagnosticSink) -> Self {
        Self { tenant_id, sink }
    }

    pub fn settle<T: Default>(&self, slice: Slice, outcome: Result<T, ProviderError>) -> Settled<T> {
        match outcome {
            Ok(value) => Settled::ok(value),
            Err(error) => {
                self.sink.record(DiagnosticEvent::SliceFailed {
                    tenant_id: self.tenant_id.clone(),
                    slice,
                    error: error.to_string(),
                });
                Settled {
                    value: T::default(),
                    failed: true,
                }
            }
        }
    }

    pub async fn isolate<T, F>(&self, slice: Slice, lookup: F) -> Settled<T>
    where
        T: Default,
        F: Future<Output = Result<T, ProviderError>>,
    {
        self.settle(slice, lookup.await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::MemorySink;

    #[test]
    fn success_passes_value_through() {
        let sink = MemorySink::default();
        let tenant = TenantId("t-1".to_string());
        let isolation = Isolation::new(&tenant, &sink);

        let settled = isolation.settle(Slice::Maintenance, Ok(vec![1, 2, 3]));

        assert_eq!(settled, Settled::ok(vec![1, 2, 3]));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn failure_defaults_and_records_slice() {
        let sink = MemorySink::default();
        let tenant = TenantId("t-1".to_string());
        let isolation = Isolation::new(&tenant, &sink);

        let settled: Settled<Vec<u8>> =
            isolation.settle(Slice::Billing, Err(ProviderError::Timeout));

        assert!(settled.failed);
        assert!(settled.value.is_empty());
        assert_eq!(
            sink.events(),
            vec![DiagnosticEvent::SliceFailed {
                tenant_id: tenant.clone(),
                slice: Slice::Billing,
                error: "provider request timed out".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn isolate_awaits_the_lookup() {
        let sink = MemorySink::default();
        let tenant = TenantId("t-1".to_string());
        let isolation = Isolation::new(&tenant, &sink);

        let settled = isolation
            .isolate(Slice::Room, async { Ok::<_, ProviderError>(Some(7u8)) })
            .await;
        assert_eq!(settled.into_parts(), (Some(7), false));

        let failed: Settled<Option<u8>> = isolation
            .isolate(Slice::Room, async {
                Err(ProviderError::Unavailable("rooms offline".to_string()))
            })
            .await;
        assert_eq!(failed.into_parts(), (None, true));
    }
}
