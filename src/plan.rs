//! Weekly focus plan.
//!
//! One fixed entry per weekday with the expected energy and the two areas
//! that deserve the day's best blocks.

use chrono::Weekday;

use crate::types::EnergyLevel;

/// Focus guidance for one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPlan {
    pub weekday: Weekday,
    /// Display name of the day
    pub name: &'static str,
    pub energy: EnergyLevel,
    /// Main focus
    pub primary: &'static str,
    /// Secondary focus
    pub secondary: &'static str,
    pub guidance: &'static str,
}

/// The plan from Monday to Sunday.
pub static WEEKLY_PLAN: [DayPlan; 7] = [
    DayPlan {
        weekday: Weekday::Mon,
        name: "Lunes",
        energy: EnergyLevel::High,
        primary: "Trading: Análisis y Backtesting",
        secondary: "CMM: Revisión de la Semana Anterior",
        guidance: "Usa la energía renovada del inicio de semana para el análisis riguroso.",
    },
    DayPlan {
        weekday: Weekday::Tue,
        name: "Martes",
        energy: EnergyLevel::Medium,
        primary: "Impresión 3D: Prototipo y Diseño",
        secondary: "Contenido con IA: Generación de Ideas",
        guidance: "Día ideal para la ejecución física y la resolución de problemas técnicos.",
    },
    DayPlan {
        weekday: Weekday::Wed,
        name: "Miércoles",
        energy: EnergyLevel::Low,
        primary: "CMM: Estudio Profundo de Módulo",
        secondary: "Trading: Psicología y Diario",
        guidance: "Día central de la semana. Tarea de Baja Energía/Alta Importancia.",
    },
    DayPlan {
        weekday: Weekday::Thu,
        name: "Jueves",
        energy: EnergyLevel::Medium,
        primary: "Contenido con IA: Producción y Guion",
        secondary: "Impresión 3D: Mantenimiento/Ventas",
        guidance: "Día para la creación de contenido y práctica de la Acción Imperfecta.",
    },
    DayPlan {
        weekday: Weekday::Fri,
        name: "Viernes",
        energy: EnergyLevel::Medium,
        primary: "Trading: Cierre de Semana y Planificación",
        secondary: "CMM: Práctica de Ejercicios",
        guidance: "Momento para la reflexión y la toma de decisiones finales.",
    },
    DayPlan {
        weekday: Weekday::Sat,
        name: "Sábado",
        energy: EnergyLevel::High,
        primary: "Día de Integración y Creación",
        secondary: "Lectura: Revisión de Notas",
        guidance: "Dedicar tiempo a un proyecto grande de 3D o producción masiva de IA.",
    },
    DayPlan {
        weekday: Weekday::Sun,
        name: "Domingo",
        energy: EnergyLevel::Low,
        primary: "Descanso y Planificación Semanal",
        secondary: "Gimnasio: Movilidad/Estiramiento",
        guidance: "Día para la recarga emocional y la planificación de la semana siguiente.",
    },
];

/// Returns the plan for a weekday.
pub fn for_weekday(weekday: Weekday) -> &'static DayPlan {
    &WEEKLY_PLAN[weekday.num_days_from_monday() as usize]
}
