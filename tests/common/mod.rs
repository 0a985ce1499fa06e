//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rustpatcher::{AnyValue, PatchLogger, PatchSubject, PatchValue, Patchable, accessors};

// ============================================================================
// Address
// ============================================================================

#[derive(Patchable, Debug, Clone, Default, PartialEq)]
#[patch(accessors)]
pub struct TestAddress {
    city: String,
    zip_code: i32,
}

#[accessors]
impl TestAddress {
    pub fn new(city: &str, zip_code: i32) -> Self {
        Self {
            city: city.to_string(),
            zip_code,
        }
    }

    pub fn get_city(&self) -> String {
        self.city.clone()
    }

    pub fn set_city(&mut self, city: String) {
        self.city = city;
    }

    pub fn get_zip_code(&self) -> i32 {
        self.zip_code
    }

    pub fn set_zip_code(&mut self, zip_code: i32) -> Result<(), String> {
        if zip_code < 0 {
            return Err(format!("invalid zip code {zip_code}"));
        }
        self.zip_code = zip_code;
        Ok(())
    }
}

// ============================================================================
// DTO
// ============================================================================

#[derive(Patchable, Debug, Clone, Default)]
#[patch(accessors)]
pub struct TestDto {
    full_name: Option<String>,
    age: i32,
    active: bool,
    birthdate: Option<String>,
    pub public_field: Option<String>,
}

#[accessors]
impl TestDto {
    pub fn get_full_name(&self) -> Option<String> {
        self.full_name.clone()
    }

    pub fn set_full_name(&mut self, full_name: Option<String>) {
        self.full_name = full_name;
    }

    pub fn get_age(&self) -> i32 {
        self.age
    }

    pub fn set_age(&mut self, age: i32) {
        self.age = age;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn get_public_field(&self) -> Option<String> {
        self.public_field.clone()
    }

    pub fn set_public_field(&mut self, public_field: Option<String>) {
        self.public_field = public_field;
    }

    pub fn get_birthdate(&self) -> Option<String> {
        self.birthdate.clone()
    }

    pub fn set_birthdate(&mut self, birthdate: Option<String>) {
        self.birthdate = birthdate;
    }
}

// ============================================================================
// Entity
// ============================================================================

#[derive(Patchable, Debug, Clone, Default, PartialEq)]
#[patch(accessors)]
pub struct TestEntity {
    name: Option<String>,
    age: i32,
    active: bool,
    address: Option<TestAddress>,
    birthdate: Option<NaiveDate>,
    some_field: Option<String>,
    pub public_field: Option<String>,
    pub public_object_field: Option<AnyValue>,
}

#[accessors]
impl TestEntity {
    pub fn get_name(&self) -> Option<String> {
        self.name.clone()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn get_age(&self) -> i32 {
        self.age
    }

    pub fn set_age(&mut self, age: i32) {
        self.age = age;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn get_address(&self) -> Option<TestAddress> {
        self.address.clone()
    }

    pub fn set_address(&mut self, address: Option<TestAddress>) {
        self.address = address;
    }

    pub fn get_something(&self, a: i32) -> i32 {
        a
    }

    fn set_some_field(&mut self, some_field: Option<String>) {
        self.some_field = some_field;
    }

    pub fn get_static_field() -> &'static str {
        "static"
    }

    pub fn set_static_field(_value: String) {}

    pub fn get_birthdate(&self) -> Option<NaiveDate> {
        self.birthdate
    }

    pub fn set_birthdate(&mut self, birthdate: Option<NaiveDate>) {
        self.birthdate = birthdate;
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn parse_date(raw: String) -> anyhow::Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(&raw, "%Y-%m-%d")?)
}

// ============================================================================
// Logger
// ============================================================================

/// Remembers every notification it receives.
#[derive(Default)]
pub struct RecordingLogger {
    starts: AtomicUsize,
    fields: Mutex<Vec<(String, String, Option<AnyValue>)>>,
}

impl RecordingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn as_logger(self: &Arc<Self>) -> Arc<dyn PatchLogger> {
        self.clone()
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn fields(&self) -> Vec<(String, String, Option<AnyValue>)> {
        self.fields.lock().unwrap().clone()
    }

    /// `(source, destination)` pairs sorted by source.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<_> = self
            .fields()
            .into_iter()
            .map(|(from, to, _)| (from, to))
            .collect();
        pairs.sort();
        pairs
    }

    pub fn value_of(&self, destination: &str) -> Option<AnyValue> {
        self.fields()
            .into_iter()
            .find(|(_, to, _)| to == destination)
            .and_then(|(_, _, value)| value)
    }
}

impl PatchLogger for RecordingLogger {
    fn on_patch_start(&self, _source: PatchSubject<'_>, _destination: PatchSubject<'_>) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_field_patched(
        &self,
        source_field: &str,
        destination_field: &str,
        new_value: Option<&dyn PatchValue>,
    ) {
        let value = new_value.map(|value| AnyValue::from_value(value.clone_value()));
        self.fields.lock().unwrap().push((
            source_field.to_string(),
            destination_field.to_string(),
            value,
        ));
    }
}
