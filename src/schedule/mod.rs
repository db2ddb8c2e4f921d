//! Workshop slot scheduling views.
//!
//! Capacity here is display-only: the backend owns seat enforcement. These
//! views order slots by weekday, colour them by remaining seats, and decide
//! which ones a student may pick.

use chrono::NaiveTime;
use serde::Serialize;

use crate::errors::{AppError, FieldErrors};
use crate::models::{Inscription, NewTurno, Turno, WorkshopDetails};

/// Canonical weekday names, in display order.
pub const WEEKDAYS: [&str; 7] = [
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
    "Domingo",
];

/// Seats at or below this count are shown as running out.
const LOW_SEATS: u32 = 2;

fn fold_accents(day: &str) -> String {
    day.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            other => other,
        })
        .collect()
}

/// Position of a weekday in [`WEEKDAYS`], tolerant of case and accents.
pub fn weekday_index(day: &str) -> Option<usize> {
    let folded = fold_accents(day);
    WEEKDAYS.iter().position(|d| fold_accents(d) == folded)
}

/// Sort slots Monday first; unknown day names go last, ties by start then end time.
pub fn sort_turnos(turnos: &mut [Turno]) {
    turnos.sort_by(|a, b| {
        let rank = |t: &Turno| weekday_index(&t.dia_semana).unwrap_or(WEEKDAYS.len());
        rank(a)
            .cmp(&rank(b))
            .then_with(|| a.hora_inicio.cmp(&b.hora_inicio))
            .then_with(|| a.hora_fin.cmp(&b.hora_fin))
    });
}

/// How close a slot is to being full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityLevel {
    Full,
    Low,
    Available,
}

impl CapacityLevel {
    pub fn of(turno: &Turno) -> Self {
        if turno.is_full() {
            CapacityLevel::Full
        } else if turno.remaining() <= LOW_SEATS {
            CapacityLevel::Low
        } else {
            CapacityLevel::Available
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            CapacityLevel::Full => "red",
            CapacityLevel::Low => "orange",
            CapacityLevel::Available => "green",
        }
    }
}

/// A slot as the admin schedule shows it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    #[serde(flatten)]
    pub turno: Turno,
    pub remaining: u32,
    pub is_full: bool,
    pub capacity_label: String,
    pub level: CapacityLevel,
    pub color: &'static str,
}

impl From<Turno> for SlotView {
    fn from(turno: Turno) -> Self {
        let level = CapacityLevel::of(&turno);
        Self {
            remaining: turno.remaining(),
            is_full: turno.is_full(),
            capacity_label: format!("{}/{}", turno.cupos_inscriptos, turno.cupo_maximo),
            level,
            color: level.color(),
            turno,
        }
    }
}

/// All slots of one course, sorted for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub course_id: String,
    pub slots: Vec<SlotView>,
    pub total_capacity: u32,
    pub total_enrolled: u32,
}

impl ScheduleView {
    pub fn build(course_id: &str, mut turnos: Vec<Turno>) -> Self {
        sort_turnos(&mut turnos);
        let total_capacity = turnos.iter().map(|t| t.cupo_maximo).sum();
        let total_enrolled = turnos.iter().map(|t| t.cupos_inscriptos).sum();
        Self {
            course_id: course_id.to_string(),
            slots: turnos.into_iter().map(SlotView::from).collect(),
            total_capacity,
            total_enrolled,
        }
    }
}

/// One choice in the public slot picker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorOption {
    pub id: String,
    pub dia_semana: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub is_full: bool,
    pub selectable: bool,
    pub selected: bool,
    pub label: String,
}

/// Seat availability text shown next to a slot.
pub fn seats_label(turno: &Turno) -> String {
    if turno.is_blocked {
        "No disponible".to_string()
    } else if turno.is_full() {
        "Completo".to_string()
    } else {
        match turno.remaining() {
            1 => "1 lugar".to_string(),
            n => format!("{} lugares", n),
        }
    }
}

/// Build picker options. A full or blocked slot can never be the selected one.
pub fn selector_options(mut turnos: Vec<Turno>, selected: Option<&str>) -> Vec<SelectorOption> {
    sort_turnos(&mut turnos);
    turnos
        .into_iter()
        .map(|turno| {
            let selectable = turno.is_selectable();
            SelectorOption {
                selected: selectable && selected == Some(turno.id.as_str()),
                is_full: turno.is_full(),
                label: seats_label(&turno),
                selectable,
                id: turno.id,
                dia_semana: turno.dia_semana,
                fecha: turno.fecha,
                hora_inicio: turno.hora_inicio,
                hora_fin: turno.hora_fin,
            }
        })
        .collect()
}

/// Check that `turno_id` names a slot a student may pick right now.
pub fn ensure_selectable<'a>(turnos: &'a [Turno], turno_id: &str) -> Result<&'a Turno, AppError> {
    let turno = turnos
        .iter()
        .find(|t| t.id == turno_id)
        .ok_or_else(|| AppError::field("turnoId", "El turno seleccionado no existe"))?;

    if turno.is_blocked {
        return Err(AppError::field("turnoId", "El turno seleccionado no está disponible"));
    }
    if turno.is_full() {
        return Err(AppError::field("turnoId", "El turno seleccionado está completo"));
    }
    Ok(turno)
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Validate a new slot and normalize its weekday and times.
pub fn validate_new_turno(input: NewTurno) -> Result<NewTurno, AppError> {
    let mut errors = FieldErrors::new();

    if input.course_id.trim().is_empty() {
        errors.insert("courseId".into(), "El curso es obligatorio".into());
    }

    let day = weekday_index(&input.dia_semana).map(|i| WEEKDAYS[i]);
    if day.is_none() {
        errors.insert("diaSemana".into(), "Selecciona un día de la semana".into());
    }

    let start = parse_time(&input.hora_inicio);
    let end = parse_time(&input.hora_fin);
    if start.is_none() {
        errors.insert("horaInicio".into(), "La hora de inicio debe tener formato HH:MM".into());
    }
    if end.is_none() {
        errors.insert("horaFin".into(), "La hora de fin debe tener formato HH:MM".into());
    }
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            errors.insert(
                "horaFin".into(),
                "La hora de fin debe ser posterior a la de inicio".into(),
            );
        }
    }

    if input.cupo_maximo == 0 {
        errors.insert("cupoMaximo".into(), "El cupo debe ser de al menos 1 lugar".into());
    }

    match (errors.is_empty(), day, start, end) {
        (true, Some(day), Some(start), Some(end)) => Ok(NewTurno {
            course_id: input.course_id.trim().to_string(),
            dia_semana: day.to_string(),
            hora_inicio: start.format("%H:%M").to_string(),
            hora_fin: end.format("%H:%M").to_string(),
            cupo_maximo: input.cupo_maximo,
        }),
        _ => Err(AppError::form(errors)),
    }
}

/// Students of one slot in the workshop roster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSlot {
    pub slot: SlotView,
    pub students: Vec<Inscription>,
}

/// Workshop slots with their students, plus anyone without a slot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopRoster {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_title: Option<String>,
    pub slots: Vec<RosterSlot>,
    pub unassigned: Vec<Inscription>,
}

impl WorkshopRoster {
    pub fn build(details: WorkshopDetails) -> Self {
        let WorkshopDetails {
            course,
            mut turnos,
            inscriptions,
        } = details;
        sort_turnos(&mut turnos);

        let mut slots: Vec<RosterSlot> = turnos
            .into_iter()
            .map(|turno| RosterSlot {
                slot: SlotView::from(turno),
                students: Vec::new(),
            })
            .collect();
        let mut unassigned = Vec::new();

        for inscription in inscriptions {
            let slot = inscription
                .turno_id
                .as_deref()
                .and_then(|id| slots.iter_mut().find(|s| s.slot.turno.id == id));
            match slot {
                Some(slot) => slot.students.push(inscription),
                None => unassigned.push(inscription),
            }
        }

        for slot in &mut slots {
            slot.students
                .sort_by(|a, b| (&a.apellido, &a.nombre).cmp(&(&b.apellido, &b.nombre)));
        }

        Self {
            course_title: course.map(|c| c.title),
            slots,
            unassigned,
        }
    }
}
