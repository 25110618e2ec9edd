//! End-to-end scenarios exercising the full regex→DFA and grammar→table→parse pipelines
//! together, rather than one component at a time (ambient expansion, §13).
