//! GPT-2 language model on candle.
//!
//! Weight names follow the Hugging Face checkpoints (`wte`, `wpe`, `h.{i}.*`,
//! `ln_f`), with or without the `transformer.` prefix. Projections are stored
//! as Conv1D, i.e. `[in, out]`, and the LM head is tied to `wte`.

use candle_core::{DType, Device, IndexOp, Result, Tensor, D};
use candle_nn::{Embedding, LayerNorm, Module, VarBuilder};
use serde::Deserialize;

fn default_layer_norm_epsilon() -> f64 {
    1e-5
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Gpt2Config {
    pub vocab_size: usize,
    pub n_positions: usize,
    pub n_embd: usize,
    pub n_layer: usize,
    pub n_head: usize,
    #[serde(default = "default_layer_norm_epsilon")]
    pub layer_norm_epsilon: f64,
}

struct Conv1D {
    weight: Tensor,
    bias: Tensor,
}

impl Conv1D {
    fn load(in_dim: usize, out_dim: usize, vb: VarBuilder) -> Result<Self> {
        let weight = vb.get((in_dim, out_dim), "weight")?;
        let bias = vb.get(out_dim, "bias")?;
        Ok(Self { weight, bias })
    }

    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        xs.broadcast_matmul(&self.weight)?.broadcast_add(&self.bias)
    }
}

fn causal_mask(size: usize, device: &Device) -> Result<Tensor> {
    let mask: Vec<u8> = (0..size)
        .flat_map(|i| (0..size).map(move |j| u8::from(j > i)))
        .collect();
    Tensor::from_slice(&mask, (size, size), device)
}

fn masked_fill(on_false: &Tensor, mask: &Tensor, on_true: f32) -> Result<Tensor> {
    let shape = mask.shape();
    let on_true = Tensor::new(on_true, on_false.device())?.broadcast_as(shape.dims())?;
    mask.where_cond(&on_true, on_false)
}

struct Attention {
    c_attn: Conv1D,
    c_proj: Conv1D,
    n_head: usize,
    head_dim: usize,
}

impl Attention {
    fn load(vb: VarBuilder, config: &Gpt2Config) -> Result<Self> {
        let c_attn = Conv1D::load(config.n_embd, 3 * config.n_embd, vb.pp("c_attn"))?;
        let c_proj = Conv1D::load(config.n_embd, config.n_embd, vb.pp("c_proj"))?;
        Ok(Self {
            c_attn,
            c_proj,
            n_head: config.n_head,
            head_dim: config.n_embd / config.n_head,
        })
    }

    fn split_heads(&self, xs: &Tensor, b: usize, t: usize) -> Result<Tensor> {
        xs.contiguous()?
            .reshape((b, t, self.n_head, self.head_dim))?
            .transpose(1, 2)?
            .contiguous()
    }

    fn forward(&self, xs: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let (b, t, c) = xs.dims3()?;
        let qkv = self.c_attn.forward(xs)?;
        let q = self.split_heads(&qkv.narrow(2, 0, c)?, b, t)?;
        let k = self.split_heads(&qkv.narrow(2, c, c)?, b, t)?;
        let v = self.split_heads(&qkv.narrow(2, 2 * c, c)?, b, t)?;

        let scale = 1.0 / (self.head_dim as f64).sqrt();
        let att = q.matmul(&k.t()?.contiguous()?)?.affine(scale, 0.0)?;
        let mask = mask.broadcast_as(att.dims())?;
        let att = masked_fill(&att, &mask, f32::NEG_INFINITY)?;
        let att = candle_nn::ops::softmax(&att, D::Minus1)?;

        let ys = att
            .matmul(&v)?
            .transpose(1, 2)?
            .contiguous()?
            .reshape((b, t, c))?;
        self.c_proj.forward(&ys)
    }
}

struct Mlp {
    c_fc: Conv1D,
    c_proj: Conv1D,
}

impl Mlp {
    fn load(vb: VarBuilder, config: &Gpt2Config) -> Result<Self> {
        let inner = 4 * config.n_embd;
        Ok(Self {
            c_fc: Conv1D::load(config.n_embd, inner, vb.pp("c_fc"))?,
            c_proj: Conv1D::load(inner, config.n_embd, vb.pp("c_proj"))?,
        })
    }

    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        // gelu_new, the tanh approximation
        self.c_proj.forward(&self.c_fc.forward(xs)?.gelu()?)
    }
}

struct Block {
    ln_1: LayerNorm,
    attn: Attention,
    ln_2: LayerNorm,
    mlp: Mlp,
}

impl Block {
    fn load(vb: VarBuilder, config: &Gpt2Config) -> Result<Self> {
        let eps = config.layer_norm_epsilon;
        Ok(Self {
            ln_1: candle_nn::layer_norm(config.n_embd, eps, vb.pp("ln_1"))?,
            attn: Attention::load(vb.pp("attn"), config)?,
            ln_2: candle_nn::layer_norm(config.n_embd, eps, vb.pp("ln_2"))?,
            mlp: Mlp::load(vb.pp("mlp"), config)?,
        })
    }

    fn forward(&self, xs: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let xs = (xs + self.attn.forward(&self.ln_1.forward(xs)?, mask)?)?;
        let ys = self.mlp.forward(&self.ln_2.forward(&xs)?)?;
        xs + ys
    }
}

pub struct Gpt2 {
    wte: Embedding,
    wte_weight: Tensor,
    wpe: Embedding,
    blocks: Vec<Block>,
    ln_f: LayerNorm,
    config: Gpt2Config,
}

impl Gpt2 {
    pub fn load(vb: VarBuilder, config: &Gpt2Config) -> Result<Self> {
        match Self::load_with_prefix(vb.pp("transformer"), config) {
            Ok(model) => Ok(model),
            Err(_) => Self::load_with_prefix(vb, config),
        }
    }

    fn load_with_prefix(vb: VarBuilder, config: &Gpt2Config) -> Result<Self> {
        let wte_weight = vb.get((config.vocab_size, config.n_embd), "wte.weight")?;
        let wpe_weight = vb.get((config.n_positions, config.n_embd), "wpe.weight")?;
        let blocks = (0..config.n_layer)
            .map(|i| Block::load(vb.pp("h").pp(i), config))
            .collect::<Result<Vec<_>>>()?;
        let ln_f = candle_nn::layer_norm(config.n_embd, config.layer_norm_epsilon, vb.pp("ln_f"))?;

        Ok(Self {
            wte: Embedding::new(wte_weight.clone(), config.n_embd),
            wte_weight,
            wpe: Embedding::new(wpe_weight, config.n_embd),
            blocks,
            ln_f,
            config: config.clone(),
        })
    }

    pub fn max_positions(&self) -> usize {
        self.config.n_positions
    }

    /// Logits for the token following the last position, shape `[batch, vocab]`.
    pub fn forward(&self, input_ids: &Tensor) -> Result<Tensor> {
        let (_b, t) = input_ids.dims2()?;
        let device = input_ids.device();
        let positions = Tensor::arange(0u32, t as u32, device)?.unsqueeze(0)?;

        let mut xs = self
            .wte
            .forward(input_ids)?
            .broadcast_add(&self.wpe.forward(&positions)?)?;
        let mask = causal_mask(t, device)?;
        for block in &self.blocks {
            xs = block.forward(&xs, &mask)?;
        }
        let xs = self.ln_f.forward(&xs)?;

        xs.i((.., t - 1, ..))?
            .matmul(&self.wte_weight.t()?)?
            .to_dtype(DType::F32)
    }
}
