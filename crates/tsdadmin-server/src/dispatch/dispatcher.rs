use std::panic::AssertUnwindSafe;

use axum::{extract::Request, response::Response};
use futures_util::FutureExt;

use tsdadmin_core::{extract_endpoint, AdminError, Result};

use crate::collab::ConnHandle;
use crate::dispatch::{Command, CommandTable, Services};
use crate::query::HttpQuery;

enum Routed {
    Handled,
    NoSuchCommand,
}

/// Routes every inbound request to its command and turns the outcome into
/// exactly one response.
///
/// Nothing a command does (error or panic) escapes `dispatch`. Client errors
/// become 400s; everything else becomes a 500 and bumps `http.exceptions`.
/// Each call bumps `http.queries` once.
pub struct RequestDispatcher {
    table: CommandTable,
    services: Services,
}

impl RequestDispatcher {
    pub fn new(table: CommandTable, services: Services) -> Self {
        Self { table, services }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub async fn dispatch(&self, request: Request, conn: ConnHandle) -> Response {
        let mut query = HttpQuery::new(request, conn);

        let routed = AssertUnwindSafe(self.route(&mut query))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(AdminError::from_panic(panic.as_ref())));

        // Client errors must be told apart before the catch-all.
        match routed {
            Ok(Routed::Handled) => {
                tracing::info!(
                    conn = %query.connection(),
                    uri = %query.uri(),
                    elapsed_ms = query.processing_time_millis() as u64,
                    "HTTP request done"
                );
            }
            Ok(Routed::NoSuchCommand) => {
                tracing::debug!(conn = %query.connection(), uri = %query.uri(), "no such command");
                query.not_found();
            }
            Err(e) if e.is_client_error() => {
                query.bad_request(&e.client_message());
            }
            Err(e) => {
                tracing::error!(
                    conn = %query.connection(),
                    uri = %query.uri(),
                    code = e.client_code().as_str(),
                    error = %e,
                    "HTTP request failed"
                );
                query.internal_error(&e);
                self.services.counters.exception_caught();
            }
        }

        self.services.counters.query_received(query.processing_time());
        query.into_response()
    }

    async fn route(&self, query: &mut HttpQuery) -> Result<Routed> {
        if query.is_chunked() {
            tracing::error!(
                conn = %query.connection(),
                uri = %query.uri(),
                "received an unsupported chunked request"
            );
            return Err(AdminError::bad_request("Chunked request not supported."));
        }

        let uri = query.uri();
        let Some(cmd) = self.table.get(extract_endpoint(&uri)?) else {
            return Ok(Routed::NoSuchCommand);
        };

        cmd.process(&self.services, query).await?;
        if !query.has_reply() {
            return Err(AdminError::internal(format!(
                "command {} completed without a reply",
                cmd.name()
            )));
        }
        Ok(Routed::Handled)
    }
}
