use crate::machine::MachineOutcome;
use crate::model::{Course, CourseId};
use crate::tokens::ControlKeyword;
use crate::writer::CombineStats;
use std::time::Duration;

/// Result of processing one course description
#[derive(Debug, Clone)]
pub struct CourseOutcome {
    pub course: CourseId,
    pub label: String,
    pub machine: MachineOutcome,
    pub processing_duration: Duration,
}

impl CourseOutcome {
    pub fn new(course: &Course, machine: MachineOutcome, processing_duration: Duration) -> Self {
        Self {
            course: course.id,
            label: course.label(),
            machine,
            processing_duration,
        }
    }

    pub fn stats(&self) -> &CombineStats {
        &self.machine.stats
    }

    pub fn halted_by(&self) -> Option<ControlKeyword> {
        self.machine.halted_by
    }

    pub fn log_success(&self) {
        crate::log_success!(
            crate::logging::codes::success::COURSE_PROCESSED,
            "Course description processed",
            "course" => self.label,
            "created" => self.machine.stats.created,
            "upgraded" => self.machine.stats.upgraded,
            "touched" => self.machine.stats.touched,
            "tokens" => self.machine.tokens_processed,
            "halted_by" => self.machine.halted_by.map_or("-", |k| k.as_str()),
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0)
        );
    }
}
