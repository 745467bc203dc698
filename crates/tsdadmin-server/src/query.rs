//! Per-request query context.
//!
//! An [`HttpQuery`] is created for every inbound request and owned by the
//! single dispatch invocation handling it. Commands answer through it; the
//! reply is buffered and turned into the HTTP response once dispatch is done.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::Request,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use tsdadmin_core::{escape_html, AdminError};

use crate::collab::ConnHandle;

const TEXT_PLAIN: &str = "text/plain; charset=UTF-8";
const TEXT_HTML: &str = "text/html; charset=UTF-8";
const APPLICATION_JSON: &str = "application/json";

struct Reply {
    status: StatusCode,
    content_type: &'static str,
    body: Bytes,
}

pub struct HttpQuery {
    request: Parts,
    conn: ConnHandle,
    start: Instant,
    reply: Option<Reply>,
}

impl HttpQuery {
    /// Wrap `request`; the body is dropped since no admin command reads one.
    pub fn new(request: Request, conn: ConnHandle) -> Self {
        let (request, _body) = request.into_parts();
        Self {
            request,
            conn,
            start: Instant::now(),
            reply: None,
        }
    }

    /// The request target as received.
    pub fn uri(&self) -> String {
        self.request.uri.to_string()
    }

    pub fn connection(&self) -> &ConnHandle {
        &self.conn
    }

    /// True when the request body uses chunked transfer coding.
    pub fn is_chunked(&self) -> bool {
        self.request
            .headers
            .get_all(header::TRANSFER_ENCODING)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
    }

    pub fn processing_time(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn processing_time_millis(&self) -> u128 {
        self.processing_time().as_millis()
    }

    /// 200 with a plain-text body.
    pub fn send_reply(&mut self, body: impl Into<Bytes>) {
        self.send_reply_as(StatusCode::OK, TEXT_PLAIN, body);
    }

    /// 200 with an HTML body, typically from [`HttpQuery::make_page`].
    pub fn send_html(&mut self, page: impl Into<Bytes>) {
        self.send_reply_as(StatusCode::OK, TEXT_HTML, page);
    }

    /// 200 with a JSON body.
    pub fn send_json(&mut self, body: impl Into<Bytes>) {
        self.send_reply_as(StatusCode::OK, APPLICATION_JSON, body);
    }

    /// Replaces any reply sent earlier for this query.
    fn send_reply_as(
        &mut self,
        status: StatusCode,
        content_type: &'static str,
        body: impl Into<Bytes>,
    ) {
        self.reply = Some(Reply {
            status,
            content_type,
            body: body.into(),
        });
    }

    pub fn not_found(&mut self) {
        let page = self.make_page(
            "Page Not Found",
            "Page Not Found",
            &format!(
                "Sorry, <code>{}</code> doesn't exist.",
                escape_html(&self.uri())
            ),
        );
        self.send_reply_as(StatusCode::NOT_FOUND, TEXT_HTML, page);
    }

    /// `explain` may contain HTML and is sent as is.
    pub fn bad_request(&mut self, explain: &str) {
        let page = self.make_page(
            "Bad Request",
            "Looks like it's your fault this time",
            &format!(
                "<blockquote><h1>Bad Request</h1>Sorry but your request was rejected \
                 as being invalid.<br/><br/>The reason provided was:<blockquote>{explain}\
                 </blockquote></blockquote>"
            ),
        );
        self.send_reply_as(StatusCode::BAD_REQUEST, TEXT_HTML, page);
    }

    pub fn internal_error(&mut self, err: &AdminError) {
        let page = self.make_page(
            "Internal Server Error",
            "Houston, we have a problem",
            &format!(
                "<blockquote><h1>Internal Server Error</h1>Oops, sorry but your request \
                 failed due to a server error.<br/><br/>Error code: {}<pre>{}</pre></blockquote>",
                err.client_code().as_str(),
                escape_html(&err.to_string())
            ),
        );
        self.send_reply_as(StatusCode::INTERNAL_SERVER_ERROR, TEXT_HTML, page);
    }

    pub fn has_reply(&self) -> bool {
        self.reply.is_some()
    }

    #[cfg(test)]
    fn reply_status(&self) -> Option<StatusCode> {
        self.reply.as_ref().map(|r| r.status)
    }

    /// Standard page layout shared by every HTML reply.
    pub fn make_page(&self, title: &str, header: &str, body: &str) -> String {
        format!(
            "<!DOCTYPE html>\
             <html><head>\
             <meta http-equiv=\"content-type\" content=\"text/html;charset=utf-8\">\
             <title>{title}</title>\
             </head><body>\
             <table class=\"tsdadmin\" width=\"100%\"><tr><td>\
             <h1>{header}</h1>\
             </td></tr></table>\
             <div id=\"content\">{body}</div>\
             </body></html>"
        )
    }

    pub fn into_response(self) -> Response {
        match self.reply {
            Some(reply) => (
                reply.status,
                [(header::CONTENT_TYPE, reply.content_type)],
                Body::from(reply.body),
            )
                .into_response(),
            None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}
