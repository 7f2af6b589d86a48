//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use crate::{Codec, CompressResult};

/// Pass-through codec used when no compression is configured.
///
/// Both directions copy the input verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NopCodec;

impl Codec for NopCodec {
    fn compress(&mut self, input: &[u8], out: &mut Vec<u8>) -> CompressResult<()> {
        out.extend_from_slice(input);
        Ok(())
    }

    fn decompress(&mut self, input: &[u8], out: &mut Vec<u8>) -> CompressResult<()> {
        out.extend_from_slice(input);
        Ok(())
    }
}
