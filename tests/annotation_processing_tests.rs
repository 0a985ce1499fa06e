/// Annotation processing tests
///
/// `#[patch(...)]` directives on source and destination types: ignore,
/// ignore_if_null, log_change, map_to and catalog-backed transforms
/// Run with: cargo test --test annotation_processing_tests

mod common;

use std::sync::Arc;

use common::{RecordingLogger, date, parse_date};
use chrono::NaiveDate;
use rustpatcher::{PatchError, Patchable, PatcherEngine, Transformer, TransformerCatalog};

#[derive(Patchable, Debug, Clone, Default)]
pub struct AnnotatedDto {
    #[patch(ignore)]
    pub id: i64,
    #[patch(ignore_if_null)]
    pub nickname: Option<String>,
    #[patch(map_to = "name")]
    pub full_name: Option<String>,
    #[patch(transform = "parse_date")]
    pub birthdate: Option<String>,
    pub email: Option<String>,
    pub score: i32,
}

#[derive(Patchable, Debug, Clone, Default, PartialEq)]
pub struct AnnotatedEntity {
    pub id: i64,
    pub nickname: Option<String>,
    pub name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    #[patch(log_change)]
    pub email: Option<String>,
    #[patch(ignore)]
    pub score: i32,
}

#[derive(Patchable, Debug, Clone, Default)]
#[patch(ignore_if_null)]
pub struct SparseDto {
    pub email: Option<String>,
    pub nickname: Option<String>,
}

#[derive(Patchable, Debug, Clone, Default, PartialEq)]
#[patch(log_change)]
pub struct AuditedEntity {
    pub email: Option<String>,
    pub nickname: Option<String>,
}

#[derive(Patchable, Debug, Clone, Default)]
pub struct ChainedDto {
    #[patch(transform("trim", "upper"))]
    pub code: Option<String>,
}

#[derive(Patchable, Debug, Clone, Default, PartialEq)]
pub struct ChainedEntity {
    pub code: Option<String>,
}

fn date_catalog() -> Arc<TransformerCatalog> {
    let catalog = TransformerCatalog::new();
    catalog.register("parse_date", Transformer::new(parse_date));
    Arc::new(catalog)
}

fn annotated_engine() -> PatcherEngine<AnnotatedDto, AnnotatedEntity> {
    PatcherEngine::default().with_catalog(date_catalog())
}

fn sample_dto() -> AnnotatedDto {
    AnnotatedDto {
        id: 7,
        nickname: Some("neo".into()),
        full_name: Some("Thomas Anderson".into()),
        birthdate: Some("1999-03-31".into()),
        email: Some("neo@example.com".into()),
        score: 99,
    }
}

#[test]
fn test_ignored_fields_are_untouched() {
    let engine = annotated_engine();
    let mut entity = AnnotatedEntity {
        id: 1,
        score: 5,
        ..AnnotatedEntity::default()
    };

    engine.patch(&sample_dto(), &mut entity).unwrap();

    assert_eq!(entity.id, 1);
    assert_eq!(entity.score, 5);
    assert_eq!(entity.email.as_deref(), Some("neo@example.com"));
}

#[test]
fn test_map_to_renames_field() {
    let engine = annotated_engine();
    let mut entity = AnnotatedEntity::default();

    engine.patch(&sample_dto(), &mut entity).unwrap();

    assert_eq!(entity.name.as_deref(), Some("Thomas Anderson"));
}

#[test]
fn test_transform_uses_catalog_entry() {
    let engine = annotated_engine();
    let mut entity = AnnotatedEntity::default();

    engine.patch(&sample_dto(), &mut entity).unwrap();

    assert_eq!(entity.birthdate, Some(date(1999, 3, 31)));
}

#[test]
fn test_missing_catalog_entry_is_reported() {
    let engine: PatcherEngine<AnnotatedDto, AnnotatedEntity> =
        PatcherEngine::default().with_catalog(Arc::new(TransformerCatalog::new()));

    let err = engine
        .patch(&sample_dto(), &mut AnnotatedEntity::default())
        .unwrap_err();

    match err {
        PatchError::TransformerNotFound { key, field } => {
            assert_eq!(key, "parse_date");
            assert_eq!(field, "birthdate");
        }
        other => panic!("expected missing transformer, got {other}"),
    }
}

#[test]
fn test_catalog_is_read_at_extraction() {
    let catalog = Arc::new(TransformerCatalog::new());
    let engine: PatcherEngine<AnnotatedDto, AnnotatedEntity> =
        PatcherEngine::default().with_catalog(Arc::clone(&catalog));

    assert!(engine.patch(&sample_dto(), &mut AnnotatedEntity::default()).is_err());

    catalog.register("parse_date", Transformer::new(parse_date));
    let engine: PatcherEngine<AnnotatedDto, AnnotatedEntity> =
        PatcherEngine::default().with_catalog(catalog);
    let mut entity = AnnotatedEntity::default();
    engine.patch(&sample_dto(), &mut entity).unwrap();
    assert_eq!(entity.birthdate, Some(date(1999, 3, 31)));
}

#[test]
fn test_field_ignore_if_null() {
    let engine = annotated_engine();
    let mut entity = AnnotatedEntity {
        nickname: Some("kept".into()),
        email: Some("old@example.com".into()),
        ..AnnotatedEntity::default()
    };
    let dto = AnnotatedDto {
        nickname: None,
        email: None,
        ..AnnotatedDto::default()
    };

    engine.patch(&dto, &mut entity).unwrap();

    assert_eq!(entity.nickname.as_deref(), Some("kept"));
    assert_eq!(entity.email, None);
}

#[test]
fn test_type_ignore_if_null() {
    let engine: PatcherEngine<SparseDto, AuditedEntity> = PatcherEngine::default();
    let mut entity = AuditedEntity {
        email: Some("old@example.com".into()),
        nickname: Some("kept".into()),
    };
    let dto = SparseDto {
        email: Some("new@example.com".into()),
        nickname: None,
    };

    engine.patch(&dto, &mut entity).unwrap();

    assert_eq!(entity.email.as_deref(), Some("new@example.com"));
    assert_eq!(entity.nickname.as_deref(), Some("kept"));
}

#[test]
fn test_field_log_change() {
    let mut engine = annotated_engine();
    let logger = RecordingLogger::new();
    engine.set_logger(Some(logger.as_logger()));

    engine
        .patch(&sample_dto(), &mut AnnotatedEntity::default())
        .unwrap();

    assert_eq!(
        logger.pairs(),
        vec![("email".to_string(), "email".to_string())]
    );
}

#[test]
fn test_type_log_change() {
    let mut engine: PatcherEngine<SparseDto, AuditedEntity> = PatcherEngine::default();
    let logger = RecordingLogger::new();
    engine.set_logger(Some(logger.as_logger()));

    let dto = SparseDto {
        email: Some("new@example.com".into()),
        nickname: Some("neo".into()),
    };
    engine.patch(&dto, &mut AuditedEntity::default()).unwrap();

    assert_eq!(
        logger.pairs(),
        vec![
            ("email".to_string(), "email".to_string()),
            ("nickname".to_string(), "nickname".to_string()),
        ]
    );
}

#[test]
fn test_explicit_mapping_shadows_map_to() {
    let mut engine = annotated_engine();
    engine.add_field_mapping("nickname", "name");

    let mut entity = AnnotatedEntity::default();
    engine.patch(&sample_dto(), &mut entity).unwrap();

    assert_eq!(entity.name.as_deref(), Some("neo"));
}

#[test]
fn test_transform_list_tries_entries_in_order() {
    let catalog = TransformerCatalog::new();
    catalog.register("trim", Transformer::from_fn(|code: String| code.trim().to_string()));
    catalog.register("upper", Transformer::from_fn(|code: String| code.to_uppercase()));
    let engine: PatcherEngine<ChainedDto, ChainedEntity> =
        PatcherEngine::default().with_catalog(Arc::new(catalog));

    let mut entity = ChainedEntity::default();
    engine
        .patch(
            &ChainedDto {
                code: Some("  ab ".into()),
            },
            &mut entity,
        )
        .unwrap();

    // The first compatible transformer wins.
    assert_eq!(entity.code.as_deref(), Some("ab"));
}

#[test]
fn test_global_catalog_is_the_default() {
    TransformerCatalog::global().register("parse_date", Transformer::new(parse_date));
    let engine: PatcherEngine<AnnotatedDto, AnnotatedEntity> = PatcherEngine::default();

    let mut entity = AnnotatedEntity::default();
    engine.patch(&sample_dto(), &mut entity).unwrap();

    assert_eq!(entity.birthdate, Some(date(1999, 3, 31)));
}
