// services/queue-dash/src/forms.rs
//
// Input forms for check-in and assignment, validated before any request

use svckit::{AppointmentType, AssignRequest, ClinicError, Priority, Room, WalkInRequest};

/// Numeric text field used for ids typed into the TUI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DigitField {
    text: String,
}

impl DigitField {
    const MAX_DIGITS: usize = 12;

    pub fn push(&mut self, c: char) {
        if c.is_ascii_digit() && self.text.len() < Self::MAX_DIGITS {
            self.text.push(c);
        }
    }

    pub fn pop(&mut self) {
        self.text.pop();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> Option<i64> {
        self.text.parse().ok().filter(|v| *v > 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkInForm {
    pub animal_id: Option<i64>,
    pub appointment_type: AppointmentType,
    pub priority: Priority,
    pub notes: String,
}

impl WalkInForm {
    pub fn validate(&self) -> Result<WalkInRequest, ClinicError> {
        let animal_id = self
            .animal_id
            .ok_or_else(|| ClinicError::Validation("Lütfen bir hasta seçin".to_string()))?;
        let notes = self.notes.trim();

        Ok(WalkInRequest {
            animal_id,
            appointment_type: self.appointment_type,
            priority: self.priority,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }

    pub fn cycle_appointment_type(&mut self) {
        self.appointment_type = next_in(&AppointmentType::ALL, self.appointment_type);
    }

    pub fn cycle_priority(&mut self) {
        self.priority = next_in(&Priority::ALL, self.priority);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignForm {
    pub veterinarian_id: Option<i64>,
    pub room: Option<Room>,
}

impl AssignForm {
    /// Submit stays disabled until a veterinarian is chosen. Room is optional.
    pub fn can_submit(&self) -> bool {
        self.veterinarian_id.is_some()
    }

    pub fn validate(&self) -> Result<AssignRequest, ClinicError> {
        let veterinarian_id = self
            .veterinarian_id
            .ok_or_else(|| ClinicError::Validation("Lütfen bir veteriner seçin".to_string()))?;
        Ok(AssignRequest {
            veterinarian_id,
            room: self.room,
        })
    }

    /// No room → first room → … → last room → no room.
    pub fn cycle_room(&mut self) {
        self.room = match self.room {
            None => Room::ALL.first().copied(),
            Some(current) => Room::ALL
                .iter()
                .position(|r| *r == current)
                .and_then(|i| Room::ALL.get(i + 1))
                .copied(),
        };
    }
}

fn next_in<T: Copy + PartialEq>(all: &[T], current: T) -> T {
    let index = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(index + 1) % all.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_in_without_patient_is_rejected() {
        let form = WalkInForm::default();
        assert!(matches!(form.validate(), Err(ClinicError::Validation(_))));
    }

    #[test]
    fn test_walk_in_builds_request() {
        let form = WalkInForm {
            animal_id: Some(42),
            appointment_type: AppointmentType::Surgery,
            priority: Priority::Emergency,
            notes: "  kanama  ".to_string(),
        };

        let request = form.validate().unwrap();
        assert_eq!(request.animal_id, 42);
        assert_eq!(request.appointment_type, AppointmentType::Surgery);
        assert_eq!(request.priority, Priority::Emergency);
        assert_eq!(request.notes.as_deref(), Some("kanama"));

        let blank_notes = WalkInForm {
            animal_id: Some(42),
            notes: "   ".to_string(),
            ..WalkInForm::default()
        };
        assert_eq!(blank_notes.validate().unwrap().notes, None);
    }

    #[test]
    fn test_assign_requires_veterinarian_only() {
        let mut form = AssignForm::default();
        assert!(!form.can_submit());
        form.room = Some(Room::Exam2);
        assert!(!form.can_submit());
        assert!(form.validate().is_err());

        form.veterinarian_id = Some(7);
        form.room = None;
        assert!(form.can_submit());
        assert_eq!(
            form.validate().unwrap(),
            AssignRequest {
                veterinarian_id: 7,
                room: None
            }
        );
    }

    #[test]
    fn test_room_cycle_wraps_through_none() {
        let mut form = AssignForm::default();
        let mut seen = Vec::new();
        for _ in 0..=Room::ALL.len() {
            form.cycle_room();
            seen.push(form.room);
        }

        assert_eq!(seen.first(), Some(&Some(Room::Exam1)));
        assert_eq!(seen[Room::ALL.len() - 1], Some(Room::Emergency));
        assert_eq!(seen.last(), Some(&None));
    }

    #[test]
    fn test_priority_and_type_cycles_wrap() {
        let mut form = WalkInForm {
            priority: Priority::Emergency,
            appointment_type: AppointmentType::Grooming,
            ..WalkInForm::default()
        };
        form.cycle_priority();
        form.cycle_appointment_type();

        assert_eq!(form.priority, Priority::Low);
        assert_eq!(form.appointment_type, AppointmentType::Examination);
    }

    #[test]
    fn test_digit_field_ignores_non_digits() {
        let mut field = DigitField::default();
        for c in "4a2 ".chars() {
            field.push(c);
        }
        assert_eq!(field.text(), "42");
        assert_eq!(field.value(), Some(42));

        field.pop();
        field.pop();
        assert_eq!(field.value(), None);

        field.push('0');
        assert_eq!(field.value(), None);
    }
}
