//! Worker thread: owns the tokio runtime and the certificate api client.

use std::{sync::Arc, thread};

use client_core::{CertificateApi, HttpCertificateApi, MissingCertificateApi, Settings};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    settings: anyhow::Result<Settings>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        emit(&ui_tx, UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                emit(
                    &ui_tx,
                    UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: failed to build runtime: {err}"),
                    )),
                );
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let api = build_api(settings, &ui_tx);
        emit(&ui_tx, UiEvent::Info("Ready".to_string()));

        while let Ok(cmd) = cmd_rx.recv() {
            let api = Arc::clone(&api);
            let ui_tx = ui_tx.clone();
            runtime.spawn(async move { run_command(api.as_ref(), cmd, &ui_tx).await });
        }
        tracing::debug!("ui command channel closed; backend worker exiting");
    })
}

fn build_api(
    settings: anyhow::Result<Settings>,
    ui_tx: &Sender<UiEvent>,
) -> Arc<dyn CertificateApi> {
    match settings.and_then(|settings| HttpCertificateApi::new(&settings)) {
        Ok(api) => Arc::new(api),
        Err(err) => {
            tracing::error!("certificate api unavailable: {err:#}");
            emit(ui_tx, UiEvent::Error(UiError::from_error(UiErrorContext::BackendStartup, &err)));
            Arc::new(MissingCertificateApi)
        }
    }
}

async fn run_command(api: &dyn CertificateApi, cmd: BackendCommand, ui_tx: &Sender<UiEvent>) {
    match cmd {
        BackendCommand::Submit { payload } => {
            let result = api.submit_request(&payload).await;
            if let Err(err) = &result {
                emit(ui_tx, UiEvent::Error(UiError::from_error(UiErrorContext::Submit, err)));
            }
            emit(ui_tx, UiEvent::SubmitFinished(result));
        }
        BackendCommand::FetchRequests { ticket } => {
            let result = api.fetch_requests().await;
            if let Err(err) = &result {
                emit(ui_tx, UiEvent::Error(UiError::from_error(UiErrorContext::FetchList, err)));
            }
            emit(ui_tx, UiEvent::RequestsLoaded { ticket, result });
        }
    }
}

fn emit(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if ui_tx.try_send(event).is_err() {
        tracing::warn!("ui event queue unavailable; dropping backend event");
    }
}
