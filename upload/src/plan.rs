// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::ops::Range;

use fileshare_core::{Error, Result};

/// Splits `[0, total)` into consecutive half-open ranges of at most `stride`
/// bytes: `[offset, min(offset + stride, total))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangePlan {
    total: u64,
    stride: u64,
}

impl RangePlan {
    /// Plan `total` bytes in steps of `stride`.
    pub fn new(total: u64, stride: u64) -> Result<Self> {
        if stride == 0 {
            return Err(Error::config_invalid("range size must be greater than zero"));
        }
        Ok(Self { total, stride })
    }

    /// Total number of bytes covered.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of ranges, `ceil(total / stride)`.
    pub fn len(&self) -> usize {
        self.total.div_ceil(self.stride) as usize
    }

    /// True when there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Ranges in ascending offset order.
    pub fn iter(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        (0..self.total)
            .step_by(self.stride as usize)
            .map(|offset| offset..self.total.min(offset + self.stride))
    }
}
