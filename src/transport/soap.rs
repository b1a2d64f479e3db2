//! SOAP 1.1 envelope transport, served by the HTTP router at `POST /soap`.
//!
//! The `Body` carries exactly one request element whose children are the
//! operation fields (`name`, `author`, `price`, `filter`):
//!
//! ```xml
//! <soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
//!   <soapenv:Body>
//!     <BookUpdateRequest><name>Dune</name><price>12.5</price></BookUpdateRequest>
//!   </soapenv:Body>
//! </soapenv:Envelope>
//! ```
//!
//! Request elements are `BookInsertRequest`, `BookQueryRequest`,
//! `BookUpdateRequest` (also accepted as `LivroUpdateRequest`) and
//! `BookDeleteRequest`; the reply is the matching `Book*Response`. Failures
//! answer with a `soapenv:Fault` (`Client` for caller errors, `Server` for
//! storage and timeouts) and the status from [`CatalogError::status_code`].

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::Instrument;

use super::dispatch::Dispatcher;
use crate::error::{CatalogError, CatalogResult};
use crate::observability::transport_span;
use crate::operation::{BookDelete, BookQuery, BookUpdate, NewBook, Operation, Outcome};
use crate::record::Record;
use crate::validate::PriceInput;

pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// The request element found inside `Body`, with its child fields.
#[derive(Debug, Default, PartialEq)]
struct SoapCall {
    element: String,
    fields: HashMap<String, String>,
}

impl SoapCall {
    fn field(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| self.fields.get(*name).cloned())
    }

    fn into_operation(self) -> CatalogResult<Operation> {
        let name = self.field(&["name", "nome"]);
        let author = self.field(&["author", "autor"]);
        let price = self.field(&["price", "preco"]).map(PriceInput::Text);
        let op = match self.element.as_str() {
            "BookInsertRequest" => Operation::Insert(NewBook {
                name,
                author,
                price,
            }),
            "BookQueryRequest" => Operation::Query(BookQuery {
                name,
                filter: self.field(&["filter"]),
            }),
            "BookUpdateRequest" | "LivroUpdateRequest" => Operation::Update(BookUpdate {
                name,
                author,
                price,
            }),
            "BookDeleteRequest" => Operation::Delete(BookDelete { name }),
            other => {
                return Err(CatalogError::validation(
                    "operation",
                    format!("unsupported request element '{other}'"),
                ))
            }
        };
        Ok(op)
    }
}

fn malformed(reason: impl std::fmt::Display) -> CatalogError {
    CatalogError::validation("envelope", reason.to_string())
}

fn local_name(raw: &[u8]) -> CatalogResult<String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|err| malformed(format!("element name is not UTF-8: {err}")))
}

/// Record an element opening at `path` (the names of its open ancestors).
fn enter(path: &[String], name: String, call: &mut Option<SoapCall>) -> CatalogResult<()> {
    let in_body = path.get(1).is_some_and(|parent| parent == "Body");
    match path.len() {
        0 if name != "Envelope" => Err(malformed(format!("expected Envelope, found <{name}>"))),
        2 if in_body => match call {
            Some(_) => Err(malformed("Body must hold exactly one request element")),
            None => {
                *call = Some(SoapCall {
                    element: name,
                    fields: HashMap::new(),
                });
                Ok(())
            }
        },
        3 if in_body => {
            if let Some(call) = call {
                call.fields.entry(name).or_default();
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn parse_envelope(xml: &str) -> CatalogResult<SoapCall> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut call: Option<SoapCall> = None;
    let mut saw_body = false;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(start) => {
                let name = local_name(start.local_name().as_ref())?;
                saw_body |= path.len() == 1 && name == "Body";
                enter(&path, name.clone(), &mut call)?;
                path.push(name);
            }
            Event::Empty(empty) => {
                let name = local_name(empty.local_name().as_ref())?;
                saw_body |= path.len() == 1 && name == "Body";
                enter(&path, name, &mut call)?;
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(malformed)?;
                append_field(&path, &mut call, &text);
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                append_field(&path, &mut call, &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !path.is_empty() {
        return Err(malformed("envelope is truncated"));
    }
    if !saw_body {
        return Err(malformed("envelope has no Body"));
    }
    call.ok_or_else(|| malformed("Body holds no request element"))
}

fn append_field(path: &[String], call: &mut Option<SoapCall>, text: &str) {
    if path.len() != 4 || path[1] != "Body" {
        return;
    }
    if let Some(call) = call {
        call.fields.entry(path[3].clone()).or_default().push_str(text);
    }
}

fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><soapenv:Envelope xmlns:soapenv="{SOAP_ENV_NS}"><soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>"#
    )
}

fn render_book(record: &Record) -> String {
    format!(
        "<book><name>{}</name><author>{}</author><price>{}</price></book>",
        escape(record.name.as_str()),
        escape(record.author.as_str()),
        record.price
    )
}

fn render_outcome(outcome: &Outcome) -> String {
    let body = match outcome {
        Outcome::Inserted { record } => format!(
            "<BookInsertResponse><message>book inserted</message>{}</BookInsertResponse>",
            render_book(record)
        ),
        Outcome::Records { records } => format!(
            "<BookQueryResponse>{}</BookQueryResponse>",
            records.iter().map(render_book).collect::<String>()
        ),
        Outcome::Updated { record } => format!(
            "<BookUpdateResponse><message>book updated</message>{}</BookUpdateResponse>",
            render_book(record)
        ),
        Outcome::Deleted { count } => {
            format!("<BookDeleteResponse><deleted>{count}</deleted></BookDeleteResponse>")
        }
    };
    envelope(&body)
}

fn render_fault(err: &CatalogError) -> String {
    let code = if err.is_retryable() {
        "soapenv:Server"
    } else {
        "soapenv:Client"
    };
    let field = err
        .field()
        .map(|field| format!("<field>{}</field>", escape(field)))
        .unwrap_or_default();
    envelope(&format!(
        "<soapenv:Fault><faultcode>{code}</faultcode><faultstring>{}</faultstring><detail><kind>{}</kind>{field}</detail></soapenv:Fault>",
        escape(err.to_string().as_str()),
        err.kind()
    ))
}

fn xml_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
        body,
    )
        .into_response()
}

/// `POST /soap`
pub(super) async fn soap_handler(State(dispatcher): State<Dispatcher>, body: Bytes) -> Response {
    let call = std::str::from_utf8(&body)
        .map_err(|err| malformed(format!("body is not UTF-8: {err}")))
        .and_then(parse_envelope)
        .and_then(SoapCall::into_operation);

    let result = match call {
        Ok(op) => {
            let span = transport_span("soap", op.name());
            dispatcher.execute(op).instrument(span).await
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(outcome) => xml_response(StatusCode::OK, render_outcome(&outcome)),
        Err(err) => {
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            xml_response(status, render_fault(&err))
        }
    }
}
