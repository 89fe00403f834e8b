//! Visit reports and tabular exports
//!
//! Cells are rendered by named formatters picked from the [`FieldKind`] of
//! each column. Spreadsheet and PDF encoding happen on the client side.

use std::{collections::HashMap, sync::Arc};

use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::{
    error::{AppError, AppResult},
    models::{
        report::{ExportTable, ReportField, VisitReport},
        Organizer, Visit, VisitStatus,
    },
    repository::RecordStore,
};

use super::{attendance::split_attendance, visits::in_month};

/// How a cell is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    /// dd/mm/YYYY
    Date,
    /// "miércoles, 10 de abril de 2024"
    LongDate,
    /// HH:MM, blank for the 00:00 sentinel
    Time,
    /// "HH:MM hrs.", blank for the 00:00 sentinel
    Hours,
    /// District name looked up from its code
    District,
    Status,
}

/// Raw value of a visit field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(Option<&'a str>),
    Integer(Option<i32>),
    Date(NaiveDate),
    Time(NaiveTime),
    Status(VisitStatus),
}

/// District names by code
pub type Districts = HashMap<i32, String>;

type Formatter = fn(FieldValue<'_>, &Districts) -> String;

impl FieldKind {
    pub fn formatter(self) -> Formatter {
        match self {
            FieldKind::Text | FieldKind::Integer => format_plain,
            FieldKind::Date => format_date,
            FieldKind::LongDate => format_long_date,
            FieldKind::Time => format_time,
            FieldKind::Hours => format_hours,
            FieldKind::District => format_district,
            FieldKind::Status => format_status,
        }
    }

    pub fn format(self, value: FieldValue<'_>, districts: &Districts) -> String {
        (self.formatter())(value, districts)
    }
}

fn format_plain(value: FieldValue<'_>, _: &Districts) -> String {
    match value {
        FieldValue::Text(text) => text.unwrap_or_default().to_string(),
        FieldValue::Integer(n) => n.map(|n| n.to_string()).unwrap_or_default(),
        FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        FieldValue::Time(t) => t.format("%H:%M:%S").to_string(),
        FieldValue::Status(s) => s.as_str().to_string(),
    }
}

fn format_date(value: FieldValue<'_>, districts: &Districts) -> String {
    match value {
        FieldValue::Date(d) => d.format("%d/%m/%Y").to_string(),
        other => format_plain(other, districts),
    }
}

const WEEKDAYS: [&str; 7] = [
    "lunes", "martes", "miércoles", "jueves", "viernes", "sábado", "domingo",
];

const MONTHS: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
    "octubre", "noviembre", "diciembre",
];

fn format_long_date(value: FieldValue<'_>, districts: &Districts) -> String {
    match value {
        FieldValue::Date(d) => format!(
            "{}, {} de {} de {}",
            WEEKDAYS[d.weekday().num_days_from_monday() as usize],
            d.day(),
            MONTHS[d.month0() as usize],
            d.year()
        ),
        other => format_plain(other, districts),
    }
}

fn format_time(value: FieldValue<'_>, districts: &Districts) -> String {
    match value {
        FieldValue::Time(t) if t == NaiveTime::MIN => String::new(),
        FieldValue::Time(t) => t.format("%H:%M").to_string(),
        other => format_plain(other, districts),
    }
}

fn format_hours(value: FieldValue<'_>, districts: &Districts) -> String {
    match format_time(value, districts) {
        s if s.is_empty() => s,
        s => format!("{} hrs.", s),
    }
}

fn format_district(value: FieldValue<'_>, districts: &Districts) -> String {
    match value {
        FieldValue::Integer(Some(code)) => districts
            .get(&code)
            .cloned()
            .unwrap_or_else(|| code.to_string()),
        other => format_plain(other, districts),
    }
}

fn format_status(value: FieldValue<'_>, districts: &Districts) -> String {
    match value {
        FieldValue::Status(s) => s.label().to_string(),
        other => format_plain(other, districts),
    }
}

/// Exportable visit fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitField {
    Id,
    Date,
    Rbd,
    School,
    OrganizerId,
    Organizer,
    Address,
    District,
    StartTime,
    EndTime,
    InstallTime,
    Contact,
    ContactPhone,
    ContactEmail,
    ContactRole,
    Counselor,
    CounselorPhone,
    CounselorEmail,
    Status,
    Notes,
}

impl VisitField {
    /// Column heading
    pub fn label(self) -> &'static str {
        match self {
            VisitField::Id => "ID",
            VisitField::Date => "Fecha",
            VisitField::Rbd => "RBD",
            VisitField::School => "Colegio",
            VisitField::OrganizerId => "Código",
            VisitField::Organizer => "Universidad",
            VisitField::Address => "Dirección",
            VisitField::District => "Comuna",
            VisitField::StartTime => "Inicio",
            VisitField::EndTime => "Término",
            VisitField::InstallTime => "Instalación",
            VisitField::Contact => "Contacto",
            VisitField::ContactPhone => "Teléfono contacto",
            VisitField::ContactEmail => "Correo contacto",
            VisitField::ContactRole => "Cargo contacto",
            VisitField::Counselor => "Orientador",
            VisitField::CounselorPhone => "Teléfono orientador",
            VisitField::CounselorEmail => "Correo orientador",
            VisitField::Status => "Estatus",
            VisitField::Notes => "Observaciones",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            VisitField::Id | VisitField::Rbd | VisitField::OrganizerId => FieldKind::Integer,
            VisitField::Date => FieldKind::Date,
            VisitField::District => FieldKind::District,
            VisitField::StartTime | VisitField::EndTime | VisitField::InstallTime => {
                FieldKind::Time
            }
            VisitField::Status => FieldKind::Status,
            _ => FieldKind::Text,
        }
    }

    pub fn value(self, visit: &Visit) -> FieldValue<'_> {
        match self {
            VisitField::Id => FieldValue::Integer(Some(visit.id)),
            VisitField::Date => FieldValue::Date(visit.visit_date),
            VisitField::Rbd => FieldValue::Integer(Some(visit.rbd)),
            VisitField::School => FieldValue::Text(Some(&visit.school_name)),
            VisitField::OrganizerId => FieldValue::Integer(Some(visit.organizer_id)),
            VisitField::Organizer => FieldValue::Text(Some(&visit.organizer_name)),
            VisitField::Address => FieldValue::Text(visit.address.as_deref()),
            VisitField::District => FieldValue::Integer(visit.district_code),
            VisitField::StartTime => FieldValue::Time(visit.start_time),
            VisitField::EndTime => FieldValue::Time(visit.end_time),
            VisitField::InstallTime => FieldValue::Time(visit.install_time),
            VisitField::Contact => FieldValue::Text(visit.contact_name.as_deref()),
            VisitField::ContactPhone => FieldValue::Text(visit.contact_phone.as_deref()),
            VisitField::ContactEmail => FieldValue::Text(visit.contact_email.as_deref()),
            VisitField::ContactRole => FieldValue::Text(visit.contact_role.as_deref()),
            VisitField::Counselor => FieldValue::Text(visit.counselor_name.as_deref()),
            VisitField::CounselorPhone => FieldValue::Text(visit.counselor_phone.as_deref()),
            VisitField::CounselorEmail => FieldValue::Text(visit.counselor_email.as_deref()),
            VisitField::Status => FieldValue::Status(visit.status),
            VisitField::Notes => FieldValue::Text(visit.notes.as_deref()),
        }
    }
}

/// Columns exported for the viewer account
pub const VIEWER_COLUMNS: [VisitField; 7] = [
    VisitField::Id,
    VisitField::Date,
    VisitField::Rbd,
    VisitField::School,
    VisitField::OrganizerId,
    VisitField::Organizer,
    VisitField::Status,
];

/// Columns exported for organizers, followed by one attendance column per university
pub const DETAILED_COLUMNS: [VisitField; 19] = [
    VisitField::Date,
    VisitField::Id,
    VisitField::Organizer,
    VisitField::School,
    VisitField::Rbd,
    VisitField::Address,
    VisitField::District,
    VisitField::InstallTime,
    VisitField::StartTime,
    VisitField::EndTime,
    VisitField::Contact,
    VisitField::ContactPhone,
    VisitField::ContactEmail,
    VisitField::ContactRole,
    VisitField::Counselor,
    VisitField::CounselorPhone,
    VisitField::CounselorEmail,
    VisitField::Status,
    VisitField::Notes,
];

/// General section of the visit report
const REPORT_FIELDS: [(&str, VisitField, FieldKind); 10] = [
    ("Organizador", VisitField::Organizer, FieldKind::Text),
    ("Nombre", VisitField::School, FieldKind::Text),
    ("RBD", VisitField::Rbd, FieldKind::Integer),
    ("Fecha", VisitField::Date, FieldKind::LongDate),
    ("Dirección", VisitField::Address, FieldKind::Text),
    ("Comuna", VisitField::District, FieldKind::District),
    ("Hora instalación", VisitField::InstallTime, FieldKind::Hours),
    ("Hora inicio", VisitField::StartTime, FieldKind::Hours),
    ("Hora término", VisitField::EndTime, FieldKind::Hours),
    ("Orientador", VisitField::Counselor, FieldKind::Text),
];

#[derive(Clone)]
pub struct ExportService {
    store: Arc<dyn RecordStore>,
    organizers: Vec<Organizer>,
    title: String,
}

impl ExportService {
    pub fn new(store: Arc<dyn RecordStore>, organizers: Vec<Organizer>, title: String) -> Self {
        Self {
            store,
            organizers,
            title,
        }
    }

    /// Visit table; organizers get every field plus attendance
    pub async fn visits(&self, requester: &Organizer, month: Option<u32>) -> AppResult<ExportTable> {
        let visits = in_month(self.store.list_visits().await?, month);
        let file_name = match month {
            None | Some(0) => "visitas.xlsx".to_string(),
            Some(m) => format!("visitas_{:02}.xlsx", m),
        };

        if requester.is_viewer() {
            let districts = Districts::new();
            return Ok(ExportTable {
                file_name,
                columns: VIEWER_COLUMNS.iter().map(|c| c.label().to_string()).collect(),
                rows: visits
                    .iter()
                    .map(|v| render_row(v, &VIEWER_COLUMNS, &districts))
                    .collect(),
            });
        }

        let districts = self.districts().await?;
        let answers: HashMap<(i32, i32), bool> = self
            .store
            .list_all_attendance()
            .await?
            .into_iter()
            .map(|a| ((a.visit_id, a.organizer_id), a.attends))
            .collect();

        let mut columns: Vec<String> = DETAILED_COLUMNS.iter().map(|c| c.label().to_string()).collect();
        columns.extend(self.organizers.iter().map(|o| o.name.clone()));

        let rows = visits
            .iter()
            .map(|visit| {
                let mut row = render_row(visit, &DETAILED_COLUMNS, &districts);
                row.extend(self.organizers.iter().map(|o| {
                    let attends = answers.get(&(visit.id, o.id)).copied().unwrap_or(false);
                    let label = if attends { "Sí" } else { "No" };
                    label.to_string()
                }));
                row
            })
            .collect();

        Ok(ExportTable {
            file_name,
            columns,
            rows,
        })
    }

    /// Proposal table grouped by proposer
    pub async fn proposals(&self) -> AppResult<ExportTable> {
        let proposals = self.store.list_proposals().await?;
        Ok(ExportTable {
            file_name: "propuestas.xlsx".to_string(),
            columns: vec!["RBD".to_string(), "Colegio".to_string(), "Proponente".to_string()],
            rows: proposals
                .into_iter()
                .map(|p| vec![p.rbd.to_string(), p.school_name, p.organizer_name])
                .collect(),
        })
    }

    /// Report data of a single visit
    pub async fn report(&self, requester: &Organizer, visit_id: i32) -> AppResult<VisitReport> {
        let visit = self
            .store
            .get_visit(visit_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Visit {} not found", visit_id)))?;
        let districts = self.districts().await?;
        let rows = self.store.list_attendance(visit_id).await?;
        let (attending, not_attending) = split_attendance(&self.organizers, &rows);

        let fields = REPORT_FIELDS
            .iter()
            .map(|(label, field, kind)| ReportField {
                label: label.to_string(),
                value: kind.format(field.value(&visit), &districts),
            })
            .collect();

        Ok(VisitReport {
            title: self.title.clone(),
            visit_id,
            file_name: format!("reporte_{}.pdf", visit.rbd),
            fields,
            notes: if requester.is_viewer() { None } else { visit.notes.clone() },
            attending,
            not_attending,
        })
    }

    async fn districts(&self) -> AppResult<Districts> {
        Ok(self
            .store
            .list_districts()
            .await?
            .into_iter()
            .map(|d| (d.code, d.name))
            .collect())
    }
}

fn render_row(visit: &Visit, columns: &[VisitField], districts: &Districts) -> Vec<String> {
    columns
        .iter()
        .map(|c| c.kind().format(c.value(visit), districts))
        .collect()
}
