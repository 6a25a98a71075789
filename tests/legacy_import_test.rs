use dance_planner::models::{DateTemplate, ScheduleItem};
use dance_planner::planner::PlannerSession;
use dance_planner::planner::legacy::{LegacyEventFields, import_prices, import_schedule};
use serde_json::json;

#[test]
fn test_structured_schedule_is_kept() {
    let raw = json!([
        { "tipo": "clase", "titulo": "Bachata básica", "inicio": "19:00", "fin": "20:00", "ritmo": 2 }
    ]);
    let items = import_schedule(Some(&raw));

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].titulo, "Bachata básica");
    assert_eq!(items[0].ritmo, Some(2));
}

#[test]
fn test_legacy_schedule_entries_are_converted() {
    let raw = json!([
        { "actividad": "Clase de salsa", "hora": "20:00" },
        { "descripcion": "Social", "inicio": "21:00", "fin": "01:00" }
    ]);
    let items = import_schedule(Some(&raw));

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].titulo, "Clase de salsa");
    assert_eq!(items[0].inicio.as_deref(), Some("20:00"));
    assert_eq!(items[1].fin.as_deref(), Some("01:00"));
}

#[test]
fn test_schedule_stored_as_string_is_parsed() {
    let raw = json!("[{\"actividad\": \"Práctica\", \"hora\": \"18:00\"}]");
    let items = import_schedule(Some(&raw));

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].titulo, "Práctica");
}

#[test]
fn test_unreadable_data_yields_empty_lists() {
    assert!(import_schedule(Some(&json!("not json at all"))).is_empty());
    assert!(import_schedule(Some(&json!(42))).is_empty());
    assert!(import_prices(Some(&json!({ "nombre": 3 }))).is_empty());
    assert!(import_schedule(None).is_empty());
}

#[test]
fn test_legacy_prices_parse_amounts() {
    let raw = json!([
        { "nombre": "Preventa", "costo": "$150 MXN" },
        { "nombre": "Taquilla", "precio": 200 },
        { "nombre": "Cortesía", "tipo": "gratis" }
    ]);
    let items = import_prices(Some(&raw));

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].precio, Some(150.0));
    assert_eq!(items[1].precio, Some(200.0));
    assert_eq!(items[2].precio, None);
}

#[test]
fn test_prefill_keeps_existing_structured_lists() {
    let mut session = PlannerSession::new(DateTemplate {
        cronograma: vec![ScheduleItem {
            tipo: "clase".to_string(),
            titulo: "Ya capturado".to_string(),
            inicio: None,
            fin: None,
            ritmo: None,
        }],
        ..DateTemplate::default()
    });

    session.prefill_from_legacy(&LegacyEventFields {
        horario: Some(json!([{ "actividad": "Viejo", "hora": "20:00" }])),
        costos: Some(json!([{ "nombre": "General", "costo": "100" }])),
    });

    assert_eq!(session.template().cronograma.len(), 1);
    assert_eq!(session.template().cronograma[0].titulo, "Ya capturado");
    assert_eq!(session.template().costos.len(), 1);
    assert_eq!(session.template().costos[0].nombre, "General");
}
