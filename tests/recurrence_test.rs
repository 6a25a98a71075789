mod support;

use dance_planner::error::AppError;
use dance_planner::models::PublicationState;
use chrono::NaiveDate;
use dance_planner::planner::{
    FlyerStatus, PlannerSession, RecurrenceRequest, generate_weekly_rows, validate_rows,
};
use support::date;

#[test]
fn test_generates_four_weekly_rows_from_base_date() {
    let mut req = RecurrenceRequest::weekly(date("2025-03-03"), 4);
    req.hora_inicio = Some("20:00".to_string());

    let rows = generate_weekly_rows(&req).expect("Failed to generate rows");

    let fechas: Vec<&str> = rows.iter().map(|r| r.fecha.as_str()).collect();
    assert_eq!(fechas, vec!["2025-03-03", "2025-03-10", "2025-03-17", "2025-03-24"]);
    assert!(rows.iter().all(|r| r.hora_inicio.as_deref() == Some("20:00")));
    assert!(rows.iter().all(|r| r.selected));
    assert!(rows.iter().all(|r| r.flyer_status == FlyerStatus::Pending));
}

#[test]
fn test_every_week_count_is_weekly() {
    for weeks in 1..=52 {
        let rows = generate_weekly_rows(&RecurrenceRequest::weekly(date("2025-01-06"), weeks))
            .expect("Failed to generate rows");
        assert_eq!(rows.len(), weeks as usize);

        for pair in rows.windows(2) {
            let a = date(&pair[0].fecha);
            let b = date(&pair[1].fecha);
            assert_eq!((b - a).num_days(), 7);
        }
    }
}

#[test]
fn test_week_count_is_clamped() {
    let rows = generate_weekly_rows(&RecurrenceRequest::weekly(date("2025-01-06"), 0)).unwrap();
    assert_eq!(rows.len(), 1);

    let rows = generate_weekly_rows(&RecurrenceRequest::weekly(date("2025-01-06"), 200)).unwrap();
    assert_eq!(rows.len(), 52);
    assert_eq!(rows[51].fecha, "2025-12-29");
}

#[test]
fn test_missing_base_date_is_refused() {
    let req = RecurrenceRequest {
        weeks: 4,
        ..RecurrenceRequest::default()
    };
    assert!(matches!(generate_weekly_rows(&req), Err(AppError::MissingBaseDate)));
}

#[test]
fn test_rows_copy_the_template_fields() {
    let req = RecurrenceRequest {
        fecha_base: Some(date("2025-03-03")),
        hora_inicio: Some("21:00".to_string()),
        hora_fin: Some("02:00".to_string()),
        estado_publicacion: PublicationState::Published,
        notas: Some("Clase previa".to_string()),
        flyer_general: None,
        weeks: 2,
    };

    let rows = generate_weekly_rows(&req).unwrap();
    for row in &rows {
        assert_eq!(row.hora_fin.as_deref(), Some("02:00"));
        assert_eq!(row.estado_publicacion, PublicationState::Published);
        assert_eq!(row.notas.as_deref(), Some("Clase previa"));
    }
    assert_ne!(rows[0].id, rows[1].id);
}

#[test]
fn test_general_flyer_marks_rows_done() {
    let mut req = RecurrenceRequest::weekly(date("2025-03-03"), 3);
    req.flyer_general = Some("https://cdn.example.com/flyer.png".to_string());

    let rows = generate_weekly_rows(&req).unwrap();
    for row in &rows {
        assert_eq!(row.flyer_status, FlyerStatus::Done);
        assert_eq!(row.flyer_url.as_deref(), Some("https://cdn.example.com/flyer.png"));
    }

    // blank flyer is ignored
    req.flyer_general = Some("   ".to_string());
    let rows = generate_weekly_rows(&req).unwrap();
    assert!(rows.iter().all(|r| r.flyer_status == FlyerStatus::Pending && r.flyer_url.is_none()));
}

#[test]
fn test_generate_appends_to_existing_rows() {
    let mut session = PlannerSession::default();
    session
        .generate(&RecurrenceRequest::weekly(date("2025-03-03"), 2))
        .unwrap();
    let added = session
        .generate(&RecurrenceRequest::weekly(date("2025-06-02"), 3))
        .unwrap();

    assert_eq!(added, 3);
    assert_eq!(session.rows().len(), 5);
    assert_eq!(session.rows().rows()[0].fecha, "2025-03-03");
    assert_eq!(session.rows().rows()[2].fecha, "2025-06-02");
}

#[test]
fn test_blank_times_become_absent() {
    let mut req = RecurrenceRequest::weekly(date("2025-03-03"), 2);
    req.hora_inicio = Some("20:00".to_string());
    req.hora_fin = Some(String::new());

    let rows = generate_weekly_rows(&req).unwrap();

    assert!(rows.iter().all(|r| r.hora_fin.is_none()));
    assert!(validate_rows(&rows).is_empty());
}

#[test]
fn test_dates_past_the_calendar_end_are_refused() {
    let base = NaiveDate::from_ymd_opt(262142, 12, 1).unwrap();
    let mut session = PlannerSession::default();

    let result = session.generate(&RecurrenceRequest::weekly(base, 52));

    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert!(session.rows().is_empty());
}
