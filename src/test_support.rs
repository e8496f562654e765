// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared test doubles for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::ApiResponse;
use crate::errors::ApiError;
use crate::lifecycle::RecordService;
use crate::normalize::canonical_type;
use crate::record::{RRSet, RRSetList, ResultInfo};
use crate::record_key::RecordKey;

/// In-memory provider that answers the way the remote API does: fully qualified
/// owners and canonical type strings.
#[derive(Default)]
pub(crate) struct MockProvider {
    records: Mutex<HashMap<RecordKey, RRSet>>,
    calls: Mutex<Vec<&'static str>>,
    fail_next: Mutex<Option<(Option<&'static str>, ApiError)>>,
    read_override: Mutex<Option<RRSetList>>,
    empty_on_missing: bool,
}

impl MockProvider {
    pub(crate) fn empty_on_missing() -> Self {
        Self {
            empty_on_missing: true,
            ..Self::default()
        }
    }

    /// Fail the next call, whatever it is.
    pub(crate) fn fail_next(&self, error: ApiError) {
        *self.fail_next.lock().unwrap() = Some((None, error));
    }

    /// Fail the next call of one operation (`create`, `read`, `update`, `delete`).
    pub(crate) fn fail_next_on(&self, operation: &'static str, error: ApiError) {
        *self.fail_next.lock().unwrap() = Some((Some(operation), error));
    }

    fn record_call(&self, operation: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(operation);
        let mut pending = self.fail_next.lock().unwrap();
        match pending.as_ref() {
            Some((None, _)) => Err(pending.take().map(|(_, e)| e).unwrap()),
            Some((Some(op), _)) if *op == operation => {
                Err(pending.take().map(|(_, e)| e).unwrap())
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn override_next_read(&self, list: RRSetList) {
        *self.read_override.lock().unwrap() = Some(list);
    }

    pub(crate) fn stored(&self, key: &RecordKey) -> Option<RRSet> {
        self.records.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn mutate(&self, key: &RecordKey, f: impl FnOnce(&mut RRSet)) {
        let mut records = self.records.lock().unwrap();
        f(records.get_mut(key).expect("record exists"));
    }

    fn remote_form(key: &RecordKey, rrset: &RRSet) -> RRSet {
        let owner = if key.owner.ends_with('.') {
            key.owner.clone()
        } else {
            format!("{}.{}", key.owner, key.zone)
        };
        RRSet {
            owner_name: owner,
            rrtype: canonical_type(&rrset.rrtype),
            ttl: rrset.ttl,
            rdata: rrset.rdata.clone(),
        }
    }
}

#[async_trait]
impl RecordService for MockProvider {
    async fn create_record(
        &self,
        key: &RecordKey,
        rrset: &RRSet,
    ) -> Result<ApiResponse, ApiError> {
        self.record_call("create")?;
        self.records
            .lock()
            .unwrap()
            .insert(key.clone(), Self::remote_form(key, rrset));
        Ok(ApiResponse {
            status: 201,
            message: Some("Successful".to_string()),
        })
    }

    async fn read_record(&self, key: &RecordKey) -> Result<RRSetList, ApiError> {
        self.record_call("read")?;
        if let Some(list) = self.read_override.lock().unwrap().take() {
            return Ok(list);
        }
        match self.records.lock().unwrap().get(key) {
            Some(rrset) => Ok(RRSetList {
                zone_name: key.zone.clone(),
                rrsets: vec![rrset.clone()],
                result_info: Some(ResultInfo {
                    total_count: 1,
                    offset: 0,
                    returned_count: 1,
                }),
            }),
            None if self.empty_on_missing => Ok(RRSetList {
                zone_name: key.zone.clone(),
                rrsets: vec![],
                result_info: Some(ResultInfo::default()),
            }),
            None => Err(ApiError::NotFound {
                resource: key.to_string(),
                code: Some(70002),
                message: "Data not found.".to_string(),
            }),
        }
    }

    async fn update_record(
        &self,
        key: &RecordKey,
        rrset: &RRSet,
    ) -> Result<ApiResponse, ApiError> {
        self.record_call("update")?;
        let mut records = self.records.lock().unwrap();
        if !records.contains_key(key) {
            return Err(ApiError::not_found(key.to_string(), "Data not found."));
        }
        records.insert(key.clone(), Self::remote_form(key, rrset));
        Ok(ApiResponse {
            status: 200,
            message: Some("Successful".to_string()),
        })
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<ApiResponse, ApiError> {
        self.record_call("delete")?;
        match self.records.lock().unwrap().remove(key) {
            Some(_) => Ok(ApiResponse {
                status: 204,
                message: None,
            }),
            None => Err(ApiError::not_found(key.to_string(), "Data not found.")),
        }
    }
}
