// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use rrstate::api::ApiResponse;
use rrstate::errors::ApiError;
use rrstate::lifecycle::RecordService;
use rrstate::normalize::canonical_type;
use rrstate::record::{RRSet, RRSetList, ResultInfo};
use rrstate::record_key::RecordKey;
use std::collections::HashMap;
use std::sync::Mutex;

/// Provider double that stores record sets in memory and echoes them back the way
/// the real API does: owners fully qualified, types in canonical form.
#[derive(Default)]
pub struct EchoProvider {
    records: Mutex<HashMap<RecordKey, RRSet>>,
}

impl EchoProvider {
    /// Overwrite the stored TTL and data, as an out-of-band edit would.
    pub fn edit(&self, key: &RecordKey, ttl: u32, rdata: &[&str]) {
        let mut records = self.records.lock().unwrap();
        let rrset = records.get_mut(key).expect("record set exists");
        rrset.ttl = ttl;
        rrset.rdata = rdata.iter().map(|v| (*v).to_string()).collect();
    }

    /// Remove a record set behind the lifecycle's back.
    pub fn forget(&self, key: &RecordKey) {
        self.records.lock().unwrap().remove(key);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordService for EchoProvider {
    async fn create_record(
        &self,
        key: &RecordKey,
        rrset: &RRSet,
    ) -> Result<ApiResponse, ApiError> {
        let stored = RRSet {
            owner_name: format!("{}.{}", key.owner, key.zone),
            rrtype: canonical_type(&rrset.rrtype),
            ttl: rrset.ttl,
            rdata: rrset.rdata.clone(),
        };
        self.records.lock().unwrap().insert(key.clone(), stored);
        Ok(ApiResponse {
            status: 201,
            message: Some("Successful".to_string()),
        })
    }

    async fn read_record(&self, key: &RecordKey) -> Result<RRSetList, ApiError> {
        let records = self.records.lock().unwrap();
        let rrsets: Vec<RRSet> = records.get(key).cloned().into_iter().collect();
        Ok(RRSetList {
            zone_name: key.zone.clone(),
            result_info: Some(ResultInfo {
                total_count: rrsets.len() as u64,
                offset: 0,
                returned_count: rrsets.len() as u64,
            }),
            rrsets,
        })
    }

    async fn update_record(
        &self,
        key: &RecordKey,
        rrset: &RRSet,
    ) -> Result<ApiResponse, ApiError> {
        let mut records = self.records.lock().unwrap();
        let Some(stored) = records.get_mut(key) else {
            return Err(ApiError::not_found(key.to_string(), "Data not found."));
        };
        stored.ttl = rrset.ttl;
        stored.rdata = rrset.rdata.clone();
        Ok(ApiResponse {
            status: 200,
            message: Some("Successful".to_string()),
        })
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<ApiResponse, ApiError> {
        match self.records.lock().unwrap().remove(key) {
            Some(_) => Ok(ApiResponse {
                status: 204,
                message: None,
            }),
            None => Err(ApiError::not_found(key.to_string(), "Data not found.")),
        }
    }
}
