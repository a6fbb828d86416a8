use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use client_core::{
    dates,
    listing::{display_reference_no, display_status},
    request_list::LIST_EMPTY_MESSAGE,
    validation::PURPOSE_MIN_CHARS,
    CertificateForm, ListStatus, RequestListView, Settings, SubmissionFlow, SubmissionState,
    SubmitRejected,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::{Color32, RichText, TextEdit};
use shared::domain::{FilterField, FormField, SortCriteria, SortField};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{err_label, UiEvent},
    orchestration::dispatch_backend_command,
};

const ERROR_COLOR: Color32 = Color32::from_rgb(0xd9, 0x4a, 0x4a);
const SUCCESS_COLOR: Color32 = Color32::from_rgb(0x3c, 0xa5, 0x5c);
const PURPOSE_PREVIEW_CHARS: usize = 60;
const SORTABLE_COLUMNS: [(SortField, &str); 2] =
    [(SortField::IssuedOn, "Issued on"), (SortField::Status, "Status")];

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "cert-portal-gui", about = "Employee certificate portal")]
pub struct StartupConfig {
    /// Settings file; defaults to ./portal.toml when present.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub api_base_url: Option<String>,
    #[arg(long)]
    pub api_key: Option<String>,
}

impl StartupConfig {
    pub fn load_settings(&self) -> anyhow::Result<Settings> {
        let settings = client_core::load_settings(self.config.as_deref())
            .context("failed to load portal settings")?
            .with_overrides(self.api_base_url.clone(), self.api_key.clone())
            .context("invalid command-line settings")?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Request,
    List,
}

pub struct PortalApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    page: Page,
    form: CertificateForm,
    submission: SubmissionFlow,
    list: RequestListView,
    status: String,
}

impl PortalApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            page: Page::Request,
            form: CertificateForm::new(),
            submission: SubmissionFlow::new(),
            list: RequestListView::new(),
            status: "Starting".to_string(),
        }
    }

    /// Switch pages. Both pages keep their state; the list refetches on every activation.
    pub fn open_page(&mut self, page: Page) {
        if self.page == page {
            return;
        }
        self.page = page;
        if page == Page::List {
            self.refresh_requests();
        }
    }

    fn refresh_requests(&mut self) {
        let ticket = self.list.activate();
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::FetchRequests { ticket },
            &mut self.status,
        );
        if !queued {
            self.list.complete(ticket, Err(anyhow!(self.status.clone())));
        }
    }

    fn submit(&mut self) {
        match self.submission.begin(&mut self.form, dates::today()) {
            Ok(payload) => {
                let queued = dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::Submit { payload },
                    &mut self.status,
                );
                if queued {
                    self.status = "Submitting request".to_string();
                } else {
                    self.submission.finish(Err(anyhow!(self.status.clone())), &mut self.form);
                }
            }
            Err(SubmitRejected::Invalid(errors)) => {
                self.status = format!("Please correct {} field(s)", errors.len());
            }
            Err(SubmitRejected::InFlight) => {}
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::SubmitFinished(result) => {
                    self.status = match self.submission.finish(result, &mut self.form) {
                        SubmissionState::Succeeded(_) => "Request submitted".to_string(),
                        SubmissionState::Failed(err) => format!("Submit failed: {}", err.message),
                        SubmissionState::Idle | SubmissionState::Submitting => {
                            self.status.clone()
                        }
                    };
                }
                UiEvent::RequestsLoaded { ticket, result } => {
                    let succeeded = result.is_ok();
                    if self.list.complete(ticket, result) && succeeded {
                        self.status = format!("Loaded {} request(s)", self.list.records().len());
                    }
                }
                UiEvent::Error(err) => {
                    tracing::warn!(context = ?err.context(), "{}", err.message());
                    self.status = format!("{}: {}", err_label(err.category()), err.message());
                }
            }
        }
    }

    fn show_navigation(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("navigation").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Certificate Portal");
                ui.separator();
                if ui
                    .selectable_label(self.page == Page::Request, "Request Certificate")
                    .clicked()
                {
                    self.open_page(Page::Request);
                }
                if ui
                    .selectable_label(self.page == Page::List, "Requests List")
                    .clicked()
                {
                    self.open_page(Page::List);
                }
            });
        });
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(RichText::new(&self.status).small());
        });
    }

    fn show_request_page(&mut self, ui: &mut egui::Ui) {
        let today = dates::today();
        let errors = self.form.visible_errors(today);
        let submitting = self.submission.is_submitting();

        ui.heading("Request a Certificate");
        ui.add_space(8.0);

        if let Some(message) = self.submission.success_message() {
            ui.colored_label(SUCCESS_COLOR, message);
        }
        if let Some(err) = self.submission.failure() {
            ui.colored_label(ERROR_COLOR, err.message.as_str());
        }

        for field in FormField::ALL {
            ui.add_space(6.0);
            ui.label(RichText::new(field.label()).strong());

            let mut value = self.form.values.field(field).to_string();
            let edit = match field {
                FormField::Purpose => TextEdit::multiline(&mut value).desired_rows(4),
                FormField::IssuedOn => TextEdit::singleline(&mut value).hint_text("YYYY-MM-DD"),
                FormField::AddressTo | FormField::EmployeeId => TextEdit::singleline(&mut value),
            };
            let response = ui.add_enabled(!submitting, edit.desired_width(f32::INFINITY));
            if response.changed() {
                self.form.set_field(field, value);
            }
            if response.lost_focus() {
                self.form.blur(field);
            }

            if field == FormField::Purpose {
                let (count, below_minimum) = self.form.purpose_counter();
                let color = if below_minimum {
                    ui.visuals().weak_text_color()
                } else {
                    SUCCESS_COLOR
                };
                ui.colored_label(color, format!("{count}/{PURPOSE_MIN_CHARS} characters"));
            }
            if let Some(message) = errors.get(field) {
                ui.colored_label(ERROR_COLOR, message);
            }
        }

        ui.add_space(12.0);
        let label = if submitting {
            "Submitting…"
        } else {
            "Submit request"
        };
        if ui
            .add_enabled(!submitting, egui::Button::new(label))
            .clicked()
        {
            self.submit();
        }
    }

    fn show_list_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("Requests");
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            for (field, label) in [
                (FilterField::ReferenceNo, "Reference No."),
                (FilterField::AddressTo, "Address to"),
                (FilterField::Status, "Status"),
            ] {
                let mut value = self.list.filters().get(field).to_string();
                let response = ui.add(
                    TextEdit::singleline(&mut value)
                        .hint_text(label)
                        .desired_width(160.0),
                );
                if response.changed() {
                    self.list.set_filter(field, value);
                }
            }
            if ui.button("Clear filters").clicked() {
                self.list.clear_filters();
            }
            if ui
                .add_enabled(!self.list.is_loading(), egui::Button::new("Refresh"))
                .clicked()
            {
                self.refresh_requests();
            }
        });
        ui.add_space(8.0);

        let sort = self.list.sort();
        let mut toggle = None;
        let mut retry = false;
        match self.list.status() {
            ListStatus::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading requests…");
                });
            }
            ListStatus::Errored(err) => {
                ui.colored_label(ERROR_COLOR, err.message.as_str());
                retry = ui.button("Retry").clicked();
            }
            ListStatus::Empty => {
                ui.label(LIST_EMPTY_MESSAGE);
            }
            ListStatus::Ready(rows) => {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        egui::Grid::new("requests_grid")
                            .striped(true)
                            .num_columns(5)
                            .show(ui, |ui| {
                                ui.label(RichText::new("Reference No.").strong());
                                ui.label(RichText::new("Address to").strong());
                                ui.label(RichText::new("Purpose").strong());
                                for (field, title) in SORTABLE_COLUMNS {
                                    if ui.button(header_label(title, sort, field)).clicked() {
                                        toggle = Some(field);
                                    }
                                }
                                ui.end_row();

                                for row in rows {
                                    ui.label(display_reference_no(row));
                                    ui.label(row.address_to.as_str());
                                    ui.label(purpose_preview(&row.purpose))
                                        .on_hover_text(row.purpose.as_str());
                                    ui.label(row.issued_on.as_str());
                                    ui.label(display_status(row));
                                    ui.end_row();
                                }
                            });
                    });
            }
        }

        if let Some(field) = toggle {
            self.list.toggle_sort(field);
        }
        if retry {
            self.refresh_requests();
        }
    }
}

fn header_label(title: &str, sort: SortCriteria, field: SortField) -> String {
    match sort.indicator(field) {
        Some(indicator) => format!("{title} {indicator}"),
        None => title.to_string(),
    }
}

fn purpose_preview(purpose: &str) -> String {
    let flat = purpose.replace('\n', " ");
    if flat.chars().count() <= PURPOSE_PREVIEW_CHARS {
        return flat;
    }
    let mut short: String = flat.chars().take(PURPOSE_PREVIEW_CHARS - 1).collect();
    short.push('…');
    short
}

impl eframe::App for PortalApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_navigation(ctx);
        self.show_status_bar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| match self.page {
            Page::Request => {
                egui::ScrollArea::vertical().show(ui, |ui| self.show_request_page(ui));
            }
            Page::List => self.show_list_page(ui),
        });

        let busy = self.submission.is_submitting() || self.list.is_loading();
        ctx.request_repaint_after(std::time::Duration::from_millis(if busy { 50 } else { 250 }));
    }
}
