use crate::middleware::{ExchangeCtx, Stage, StageOutcome};
use crate::spec_index::SpecIndex;
use crate::status::Status;
use crate::validator::RequestValidationSettings;
use std::sync::Arc;

/// Runs the full request validator (path, query, header, body, scopes) against the operation
/// the spec-match stage resolved. Scopes come from `ctx.scopes`, populated by the JWT stage
/// when scope verification is enabled; absent otherwise.
///
/// Validates against `ctx.operation_handle`'s already-matched [`crate::types::Operation`]
/// rather than re-deriving one from the raw request path: the spec-match stage's routing
/// already accounted for the spec's base path and template specificity, and re-matching on
/// the raw (un-stripped) path here would silently diverge from it whenever a base path is set.
pub struct RequestValidateStage {
    spec_index: Arc<SpecIndex>,
    settings: RequestValidationSettings,
}

impl RequestValidateStage {
    pub fn new(spec_index: Arc<SpecIndex>, settings: RequestValidationSettings) -> Self {
        Self {
            spec_index,
            settings,
        }
    }
}

impl<T> Stage<T> for RequestValidateStage
where
    T: serde::Serialize + Send + Sync,
{
    fn handle(&self, ctx: &mut ExchangeCtx<T>) -> StageOutcome {
        let Some(handle) = ctx.operation_handle.as_ref() else {
            // I2: every exchange reaching this stage has a resolved operation handle; the
            // spec-match stage either sets one or finalizes the chain before this stage runs.
            return StageOutcome::Finalize(Status::internal(
                "request validation reached with no resolved operation handle",
            ));
        };

        match self.spec_index.validator().validate_request_for_operation(
            &handle.operation,
            &ctx.request,
            &ctx.path_params,
            ctx.scopes.as_ref(),
            &self.settings,
        ) {
            Ok(()) => StageOutcome::Forward,
            Err(e) => StageOutcome::Finalize(Status::from_validation_error(&e)),
        }
    }
}
