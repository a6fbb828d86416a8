//! Backend commands queued from UI to backend worker.

use client_core::FetchTicket;
use shared::domain::CertificateRequest;

#[derive(Debug)]
pub enum BackendCommand {
    Submit { payload: CertificateRequest },
    FetchRequests { ticket: FetchTicket },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Submit { .. } => "submit",
            BackendCommand::FetchRequests { .. } => "fetch_requests",
        }
    }
}
