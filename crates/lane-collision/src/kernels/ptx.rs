//! PTX emission shared by the warp kernels.
//!
//! The hardware kernels are generated from the same [`network_steps`]
//! sequence the host kernels run, so the PTX and the Rust network agree
//! step for step. Emission targets a full 32-lane warp (`0xffffffff`
//! member mask).

use std::fmt::Write;

use super::bitonic::{network_steps, SortStep};
use crate::group::GroupSize;

/// PTX ISA version emitted in every kernel header.
pub const PTX_VERSION: &str = "8.5";

/// Minimum architecture; `redux.sync` needs sm_80 or newer.
pub const PTX_TARGET: &str = "sm_90";

const FULL_WARP: &str = "0xffffffff";

/// Comparison type of one register in a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegType {
    S32,
    U32,
}

impl RegType {
    fn suffix(self) -> &'static str {
        match self {
            Self::S32 => "s32",
            Self::U32 => "u32",
        }
    }
}

/// A sort key held in one or two registers, compared lexicographically.
#[derive(Debug, Clone, Copy)]
pub struct KeyRegs<'a> {
    pub regs: &'a [(&'a str, RegType)],
}

/// Line-oriented builder for a single `.entry` kernel.
pub struct PtxBuilder {
    out: String,
}

impl PtxBuilder {
    /// Start a module with one visible entry taking `.u64` pointer params.
    pub fn kernel(entry: &str, params: &[&str]) -> Self {
        let mut out = String::new();
        let _ = writeln!(out, ".version {PTX_VERSION}");
        let _ = writeln!(out, ".target {PTX_TARGET}");
        let _ = writeln!(out, ".address_size 64");
        out.push('\n');
        let _ = writeln!(out, ".visible .entry {entry}(");
        for (i, p) in params.iter().enumerate() {
            let sep = if i + 1 < params.len() { "," } else { "" };
            let _ = writeln!(out, "    .param .u64 {p}{sep}");
        }
        out.push_str(")\n{\n");
        Self { out }
    }

    pub fn line(&mut self, text: &str) -> &mut Self {
        self.out.push_str("    ");
        self.out.push_str(text);
        self.out.push('\n');
        self
    }

    pub fn comment(&mut self, text: &str) -> &mut Self {
        self.out.push('\n');
        self.line(&format!("// {text}"))
    }

    /// Lane id, byte offset of this thread's element, and the loaded key.
    pub fn load_lane_value(&mut self, param: &str, dst: &str) -> &mut Self {
        self.line(&format!("ld.param.u64 %rd_in, [{param}];"))
            .line("mov.u32 %tx, %tid.x;")
            .line("and.b32 %lid, %tx, 31;")
            .line("cvt.u64.u32 %rd_off, %tx;")
            .line("shl.b64 %rd_off, %rd_off, 2;")
            .line("add.u64 %rd_addr, %rd_in, %rd_off;")
            .line(&format!("ld.global.s32 {dst}, [%rd_addr];"))
    }

    /// Unrolled bitonic network over `key`, one block per [`SortStep`].
    pub fn sort_network(&mut self, key: KeyRegs<'_>) -> &mut Self {
        for step in network_steps(GroupSize::WARP) {
            self.sort_step(key, step);
        }
        self
    }

    fn sort_step(&mut self, key: KeyRegs<'_>, step: SortStep) {
        self.comment(&format!(
            "stage {}, partner mask {:#04x}",
            1u32 << step.block_bit,
            step.lane_mask
        ));
        for (reg, _) in key.regs {
            self.line(&format!(
                "shfl.sync.bfly.b32 %p{r}, {reg}, {mask}, 31, {FULL_WARP};",
                r = &reg[1..],
                mask = step.lane_mask
            ));
        }
        self.line(&format!("bfe.u32 %bb, %lid, {}, 1;", step.block_bit))
            .line(&format!("bfe.u32 %pb, %lid, {}, 1;", step.pair_bit))
            .line("xor.b32 %dir, %bb, %pb;")
            .line("setp.ne.u32 %pdir, %dir, 0;");
        self.lexicographic_less(key);
        // take the partner's key when compare(own, partner) == direction
        self.line("xor.pred %ptake, %plt, %pdir;")
            .line("not.pred %ptake, %ptake;");
        for (reg, _) in key.regs {
            self.line(&format!(
                "selp.b32 {reg}, %p{r}, {reg}, %ptake;",
                r = &reg[1..]
            ));
        }
    }

    fn lexicographic_less(&mut self, key: KeyRegs<'_>) {
        let Some(((first, first_ty), rest)) = key.regs.split_first() else {
            return;
        };
        self.line(&format!(
            "setp.lt.{} %plt, {first}, %p{};",
            first_ty.suffix(),
            &first[1..]
        ));
        let mut prev = (*first, *first_ty);
        for (reg, ty) in rest {
            self.line(&format!(
                "setp.eq.{} %peq, {}, %p{};",
                prev.1.suffix(),
                prev.0,
                &prev.0[1..]
            ))
            .line(&format!("setp.lt.{} %ptmp, {reg}, %p{};", ty.suffix(), &reg[1..]))
            .line("and.pred %ptmp, %peq, %ptmp;")
            .line("or.pred %plt, %plt, %ptmp;");
            prev = (*reg, *ty);
        }
    }

    /// `%pdup` = sorted lower neighbor equals `key`, excluding lane 0.
    pub fn lower_neighbor_duplicate(&mut self, key: &str) -> &mut Self {
        self.comment("compare against the sorted lower neighbor, lane 0 excluded")
            .line(&format!("shfl.sync.up.b32 %lower, {key}, 1, 0, {FULL_WARP};"))
            .line(&format!("setp.eq.s32 %pdup, %lower, {key};"))
            .line("setp.ne.u32 %plane, %lid, 0;")
            .line("and.pred %pdup, %pdup, %plane;")
    }

    pub fn finish(mut self) -> String {
        self.line("ret;");
        self.out.push_str("}\n");
        self.out
    }
}

/// Register declarations every warp kernel shares.
pub fn declare_registers(b: &mut PtxBuilder) {
    b.line(".reg .b32 %tx, %lid, %bb, %pb, %dir, %lower, %res, %bit, %one, %m;")
        .line(".reg .b32 %k, %pk, %r, %pr, %d, %pd;")
        .line(".reg .b64 %rd_in, %rd_out, %rd_off, %rd_addr;")
        .line(".reg .pred %plt, %peq, %ptmp, %pdir, %ptake, %pdup, %plane, %pany;");
}
